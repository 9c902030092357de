//! Link monitor
//!
//! Wraps [`LinkState`] with a give-up threshold: after `max_failures`
//! consecutive failed transfers the link drops to `Disconnected` and the
//! owner is expected to re-initialize the device.

use super::events::LinkEvent;
use super::machine::LinkState;

/// Failed transfers tolerated before re-initializing
pub const DEFAULT_MAX_FAILURES: u8 = 3;

/// Link supervisor for one peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkMonitor {
    state: LinkState,
    max_failures: u8,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FAILURES)
    }
}

impl LinkMonitor {
    /// Create a disconnected monitor
    ///
    /// A `max_failures` of 0 is treated as 1.
    pub const fn new(max_failures: u8) -> Self {
        Self {
            state: LinkState::Disconnected,
            max_failures: if max_failures == 0 { 1 } else { max_failures },
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn max_failures(&self) -> u8 {
        self.max_failures
    }

    /// Apply an event, returning the new state
    pub fn handle(&mut self, event: LinkEvent) -> LinkState {
        let mut next = self.state.transition(event);
        if next.failures() >= self.max_failures {
            next = LinkState::Disconnected;
        }

        if next != self.state {
            #[cfg(feature = "defmt")]
            defmt::info!("link: {} -> {} on {}", self.state, next, event);
        }

        self.state = next;
        next
    }

    /// Record the outcome of a transfer
    pub fn record<T, E>(&mut self, result: &Result<T, E>) -> LinkState {
        match result {
            Ok(_) => self.handle(LinkEvent::TransferOk),
            Err(_) => self.handle(LinkEvent::TransferFailed),
        }
    }

    /// Record the outcome of an initialization attempt
    pub fn record_init<T, E>(&mut self, result: &Result<T, E>) -> LinkState {
        match result {
            Ok(_) => self.handle(LinkEvent::InitSucceeded),
            Err(_) => self.handle(LinkEvent::InitFailed),
        }
    }

    /// Check if the device must be initialized before use
    pub fn needs_reinit(&self) -> bool {
        matches!(self.state, LinkState::Disconnected)
    }
}
