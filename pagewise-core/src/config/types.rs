//! Configuration types
//!
//! These types describe one display board: the panel, the bus it hangs
//! off, and how the main loop idles between refreshes.

use serde::{Deserialize, Serialize};

use pagewise_display::PanelConfig;
use pagewise_hal::{I2cConfig, LowPowerMode};

use super::ConfigError;

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Idle behaviour between refresh cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleConfig {
    /// Low-power mode used for long waits
    pub mode: LowPowerMode,
    /// Waits shorter than this skip low-power entry
    pub min_low_power_ms: u32,
    /// Delay between sensor polls / redraws
    pub poll_interval_ms: u32,
}

impl IdleConfig {
    pub const DEFAULT: Self = Self {
        mode: LowPowerMode::Vlps,
        min_low_power_ms: 250,
        poll_interval_ms: 5_000,
    };
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Burn-in avoidance: how often static text moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JiggleConfig {
    /// Minimum time between jiggle checks
    pub interval_ms: u32,
    /// Checks between moves (0 = never move)
    pub stride: u8,
}

impl JiggleConfig {
    pub const DEFAULT: Self = Self {
        interval_ms: 10_000,
        stride: 6,
    };
}

impl Default for JiggleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Layout version, see [`CONFIG_VERSION`]
    pub version: u8,
    pub panel: PanelConfig,
    pub bus: I2cConfig,
    pub idle: IdleConfig,
    pub jiggle: JiggleConfig,
}

impl EngineConfig {
    /// 128x32 SSD1306 at 0x3C on a 400 kHz bus
    pub const DEFAULT: Self = Self {
        version: CONFIG_VERSION,
        panel: PanelConfig::SSD1306_128X32,
        bus: I2cConfig::FAST,
        idle: IdleConfig::DEFAULT,
        jiggle: JiggleConfig::DEFAULT,
    };

    /// Check the configuration is usable
    ///
    /// Addresses in the reserved ranges (`0x00..=0x07`, `0x78..=0x7F`)
    /// are rejected along with anything wider than seven bits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.panel.geometry().is_err() {
            return Err(ConfigError::InvalidGeometry);
        }
        if !(0x08..=0x77).contains(&self.panel.address) {
            return Err(ConfigError::InvalidAddress);
        }
        if self.bus.half_period_ns().is_none() {
            return Err(ConfigError::InvalidFrequency);
        }
        Ok(())
    }

    /// Check the panel fits a frame buffer of `capacity` bytes
    pub fn fits(&self, capacity: usize) -> bool {
        self.panel
            .geometry()
            .is_ok_and(|g| g.buffer_len() <= capacity)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
