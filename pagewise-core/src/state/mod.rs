//! Link supervision
//!
//! Tracks whether a bus peripheral (the panel, a sensor) is reachable and
//! tells the main loop when it must be initialized again. The machine is
//! explicit, finite, and deterministic.

pub mod events;
pub mod machine;
pub mod monitor;

pub use events::LinkEvent;
pub use machine::LinkState;
pub use monitor::LinkMonitor;
