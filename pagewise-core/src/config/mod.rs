//! Configuration types
//!
//! Board configuration stored as postcard binary data. Firmware authors
//! it as TOML; the build script validates it and embeds the binary form.

pub mod types;

pub use types::*;

/// Largest serialized [`EngineConfig`]
pub const MAX_CONFIG_SIZE: usize = 64;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Panel geometry zero-sized or larger than supported
    InvalidGeometry,
    /// Bus address outside the usable 7-bit range
    InvalidAddress,
    /// Zero bus frequency
    InvalidFrequency,
    /// Stored layout version differs from this build
    VersionMismatch,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidGeometry => f.write_str("invalid panel geometry"),
            ConfigError::InvalidAddress => f.write_str("invalid bus address"),
            ConfigError::InvalidFrequency => f.write_str("bus frequency must be non-zero"),
            ConfigError::VersionMismatch => f.write_str("config version mismatch"),
            ConfigError::Serialize => f.write_str("config serialization failed"),
            ConfigError::Deserialize => f.write_str("config deserialization failed"),
        }
    }
}

impl EngineConfig {
    /// Serialize into `buf`, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Config version mismatch: found {}, expected {}",
                config.version,
                CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        config.validate()?;
        Ok(config)
    }
}
