//! Link state definition

use super::events::LinkEvent;

/// Peripheral link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not initialized, or given up on
    #[default]
    Disconnected,
    /// Initialized and answering
    Connected,
    /// Initialized, but recent transfers failed
    Degraded {
        /// Consecutive failed transfers
        failures: u8,
    },
}

impl LinkState {
    /// Check if transfers may be attempted
    pub fn is_usable(&self) -> bool {
        !matches!(self, LinkState::Disconnected)
    }

    /// Consecutive failures so far
    pub fn failures(&self) -> u8 {
        match self {
            LinkState::Degraded { failures } => *failures,
            _ => 0,
        }
    }

    /// Process an event and return the next state
    ///
    /// Failure counting has no upper bound here; giving up after too many
    /// failures is the monitor's decision.
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            // Reset from anywhere
            (_, Reset) => Disconnected,

            // Disconnected transitions
            (Disconnected, InitSucceeded) => Connected,

            // Connected transitions
            (Connected, TransferFailed) => Degraded { failures: 1 },
            (Connected, InitFailed) => Disconnected,

            // Degraded transitions
            (Degraded { failures }, TransferFailed) => Degraded {
                failures: failures.saturating_add(1),
            },
            (Degraded { .. }, TransferOk) => Connected,
            (Degraded { .. }, InitSucceeded) => Connected,
            (Degraded { .. }, InitFailed) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_connects() {
        let next = LinkState::Disconnected.transition(LinkEvent::InitSucceeded);
        assert_eq!(next, LinkState::Connected);
    }

    #[test]
    fn test_failed_init_stays_disconnected() {
        let next = LinkState::Disconnected.transition(LinkEvent::InitFailed);
        assert_eq!(next, LinkState::Disconnected);
    }

    #[test]
    fn test_reset_from_any_state() {
        let states = [
            LinkState::Disconnected,
            LinkState::Connected,
            LinkState::Degraded { failures: 3 },
        ];

        for state in states {
            assert_eq!(state.transition(LinkEvent::Reset), LinkState::Disconnected);
        }
    }

    #[test]
    fn test_degradation_flow() {
        let state = LinkState::Connected;

        let degraded = state.transition(LinkEvent::TransferFailed);
        assert_eq!(degraded, LinkState::Degraded { failures: 1 });

        let worse = degraded.transition(LinkEvent::TransferFailed);
        assert_eq!(worse.failures(), 2);
        assert!(worse.is_usable());

        // One good transfer recovers
        let recovered = worse.transition(LinkEvent::TransferOk);
        assert_eq!(recovered, LinkState::Connected);
        assert_eq!(recovered.failures(), 0);
    }

    #[test]
    fn test_failure_count_saturates() {
        let state = LinkState::Degraded { failures: u8::MAX };
        assert_eq!(
            state.transition(LinkEvent::TransferFailed),
            LinkState::Degraded { failures: u8::MAX }
        );
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(
            LinkState::Disconnected.transition(LinkEvent::TransferOk),
            LinkState::Disconnected
        );
        assert_eq!(
            LinkState::Disconnected.transition(LinkEvent::TransferFailed),
            LinkState::Disconnected
        );
        assert_eq!(
            LinkState::Connected.transition(LinkEvent::TransferOk),
            LinkState::Connected
        );
        assert_eq!(
            LinkState::Connected.transition(LinkEvent::InitSucceeded),
            LinkState::Connected
        );
    }
}
