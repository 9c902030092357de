//! Events that trigger link state transitions

/// Outcome reported by the code talking to the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Device probe/configuration succeeded
    InitSucceeded,
    /// Device probe/configuration failed
    InitFailed,
    /// A regular transfer completed
    TransferOk,
    /// A regular transfer failed
    TransferFailed,
    /// Forget the device, e.g. after a panel reset
    Reset,
}
