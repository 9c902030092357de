//! Paged OLED controller commands
//!
//! Command encoding for SSD1306 and SH1106 class controllers. Both share
//! the fundamental command set and the page memory layout; they differ in
//! how a write window is addressed.

use heapless::Vec;

use crate::framebuffer::PageGeometry;

/// Control byte preceding a command stream
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte preceding display RAM data
pub const CONTROL_DATA: u8 = 0x40;

/// Controller commands
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    // SSD1306 only
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
}

/// Longest command sequence produced here
pub const MAX_SEQUENCE: usize = 32;

/// Command bytes, without the control prefix
pub type Commands = Vec<u8, MAX_SEQUENCE>;

/// Supported controller families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    /// Window addressed with column/page range commands
    #[default]
    Ssd1306,
    /// Page addressed; RAM is 132 columns wide so panels sit at an offset
    Sh1106 { column_offset: u8 },
}

impl Controller {
    /// Power-on initialization sequence
    pub fn init_sequence(&self, geometry: PageGeometry, contrast: u8) -> Commands {
        let mux = geometry.height.saturating_sub(1).min(0x3F) as u8;
        let com_pins = if geometry.height <= 32 { 0x02 } else { 0x12 };

        let mut seq = Commands::new();
        let _ = seq.extend_from_slice(&[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            mux,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
        ]);
        if let Self::Ssd1306 = self {
            let _ = seq.extend_from_slice(&[cmd::MEMORY_MODE, 0x00]); // Horizontal
        }
        let _ = seq.extend_from_slice(&[
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            com_pins,
            cmd::SET_CONTRAST,
            contrast,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RESUME_RAM,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ]);
        seq
    }

    /// Address window for one page and inclusive column range
    pub fn window(&self, page: u8, start: u16, end: u16) -> Commands {
        let mut seq = Commands::new();
        match *self {
            Self::Ssd1306 => {
                let _ = seq.extend_from_slice(&[
                    cmd::COLUMN_ADDR,
                    start as u8,
                    end as u8,
                    cmd::PAGE_ADDR,
                    page,
                    page,
                ]);
            }
            Self::Sh1106 { column_offset } => {
                // Column pointer auto-increments, the end is implicit
                let col = start.saturating_add(u16::from(column_offset));
                let _ = seq.extend_from_slice(&[
                    cmd::SET_PAGE_ADDR | (page & 0x0F),
                    cmd::SET_LOW_COLUMN | (col & 0x0F) as u8,
                    cmd::SET_HIGH_COLUMN | ((col >> 4) & 0x0F) as u8,
                ]);
            }
        }
        seq
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(contrast: u8) -> [u8; 2] {
        [cmd::SET_CONTRAST, contrast]
    }

    /// Turn display on/off
    pub fn set_display_on(on: bool) -> [u8; 1] {
        if on {
            [cmd::DISPLAY_ON]
        } else {
            [cmd::DISPLAY_OFF]
        }
    }

    /// Invert display colors
    pub fn set_inverted(inverted: bool) -> [u8; 1] {
        if inverted {
            [cmd::SET_INVERSE]
        } else {
            [cmd::SET_NORMAL]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(height: u16) -> PageGeometry {
        PageGeometry::new(128, height).unwrap()
    }

    #[test]
    fn test_ssd1306_init_32_rows() {
        let seq = Controller::Ssd1306.init_sequence(geometry(32), 0x8F);
        assert_eq!(seq.first(), Some(&cmd::DISPLAY_OFF));
        assert_eq!(seq.last(), Some(&cmd::DISPLAY_ON));

        let mux = seq.iter().position(|&b| b == cmd::SET_MUX_RATIO).unwrap();
        assert_eq!(seq[mux + 1], 31);
        let pins = seq.iter().position(|&b| b == cmd::SET_COM_PINS).unwrap();
        assert_eq!(seq[pins + 1], 0x02);
        let contrast = seq.iter().position(|&b| b == cmd::SET_CONTRAST).unwrap();
        assert_eq!(seq[contrast + 1], 0x8F);
        assert!(seq.windows(2).any(|w| w == [cmd::MEMORY_MODE, 0x00]));
    }

    #[test]
    fn test_sh1106_init_64_rows() {
        let controller = Controller::Sh1106 { column_offset: 2 };
        let seq = controller.init_sequence(geometry(64), 0xCF);

        let mux = seq.iter().position(|&b| b == cmd::SET_MUX_RATIO).unwrap();
        assert_eq!(seq[mux + 1], 0x3F);
        let pins = seq.iter().position(|&b| b == cmd::SET_COM_PINS).unwrap();
        assert_eq!(seq[pins + 1], 0x12);
        assert!(!seq.contains(&cmd::MEMORY_MODE));
    }

    #[test]
    fn test_ssd1306_window() {
        let seq = Controller::Ssd1306.window(2, 10, 40);
        assert_eq!(seq.as_slice(), &[0x21, 10, 40, 0x22, 2, 2]);
    }

    #[test]
    fn test_sh1106_window_applies_offset() {
        let seq = Controller::Sh1106 { column_offset: 2 }.window(3, 30, 60);
        // Column 32 = 0x20
        assert_eq!(seq.as_slice(), &[0xB3, 0x00, 0x12]);
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Controller::set_contrast(0x40), [0x81, 0x40]);
        assert_eq!(Controller::set_display_on(false), [0xAE]);
        assert_eq!(Controller::set_inverted(true), [0xA7]);
    }
}
