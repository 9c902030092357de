//! Panel configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::backend::DisplayError;
use crate::controller::Controller;
use crate::framebuffer::PageGeometry;

/// Default 7-bit address of SSD1306/SH1106 modules
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Physical panel description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// 7-bit bus address
    pub address: u8,
    pub controller: Controller,
    /// Contrast applied at init (0-255)
    pub contrast: u8,
}

impl PanelConfig {
    /// 128x32 SSD1306 module
    pub const SSD1306_128X32: Self = Self {
        width: 128,
        height: 32,
        address: DEFAULT_ADDRESS,
        controller: Controller::Ssd1306,
        contrast: 0x8F,
    };

    /// 128x64 SH1106 module (132-column RAM, panel at column 2)
    pub const SH1106_128X64: Self = Self {
        width: 128,
        height: 64,
        address: DEFAULT_ADDRESS,
        controller: Controller::Sh1106 { column_offset: 2 },
        contrast: 0xCF,
    };

    pub const fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Validated page geometry
    pub const fn geometry(&self) -> Result<PageGeometry, DisplayError> {
        PageGeometry::new(self.width, self.height)
    }

    /// Check if the address fits in seven bits
    pub const fn address_valid(&self) -> bool {
        self.address <= 0x7F
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::SSD1306_128X32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.geometry().unwrap().pages(), 4);
        assert!(cfg.address_valid());

        let cfg = PanelConfig::SH1106_128X64;
        assert_eq!(cfg.geometry().unwrap().pages(), 8);
    }

    #[test]
    fn test_builders() {
        let cfg = PanelConfig::SSD1306_128X32
            .with_contrast(0x10)
            .with_address(0x3D);
        assert_eq!(cfg.contrast, 0x10);
        assert_eq!(cfg.address, 0x3D);

        assert!(!PanelConfig::default().with_address(0x80).address_valid());
    }

    #[test]
    fn test_invalid_geometry() {
        let cfg = PanelConfig {
            height: 0,
            ..PanelConfig::default()
        };
        assert_eq!(cfg.geometry(), Err(DisplayError::InvalidGeometry));
    }
}
