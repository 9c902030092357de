//! Clock and power-domain abstractions
//!
//! The register sequences that actually lower the core clock or arm a
//! deep-sleep mode are board-specific. The idle scheduler only needs to
//! enter a mode before a long wait and put things back afterwards.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Low-power mode requested while idling between refresh cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LowPowerMode {
    /// Plain timed wait, no clock changes
    Disabled,
    /// Normal stop mode
    Stop,
    /// Very-low-power stop
    #[default]
    Vlps,
}

impl LowPowerMode {
    /// Check if any low-power mode is requested
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, LowPowerMode::Disabled)
    }
}

/// Clock controller capability
///
/// `enter_low_power` returns a token describing whatever state must be put
/// back; the caller hands it to `restore` once the wait is over. The token
/// is owned by the caller for exactly one sleep.
pub trait ClockController {
    /// State captured on entry, needed to restore
    type Token;

    /// Switch into the requested low-power mode
    fn enter_low_power(&mut self, mode: LowPowerMode) -> Self::Token;

    /// Put back the state captured by `enter_low_power`
    fn restore(&mut self, token: Self::Token);
}

/// Clock controller for boards with nothing to manage
///
/// Clock handling on some chips is automatic; entering and leaving idle
/// is a no-op there.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLowPower;

impl ClockController for NoLowPower {
    type Token = ();

    fn enter_low_power(&mut self, _mode: LowPowerMode) -> Self::Token {}

    fn restore(&mut self, _token: Self::Token) {}
}

impl<T: ClockController + ?Sized> ClockController for &mut T {
    type Token = T::Token;

    fn enter_low_power(&mut self, mode: LowPowerMode) -> Self::Token {
        (**self).enter_low_power(mode)
    }

    fn restore(&mut self, token: Self::Token) {
        (**self).restore(token)
    }
}
