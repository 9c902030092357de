//! Board-agnostic core logic for pagewise display boards
//!
//! This crate contains the application logic around the refresh engine
//! that does not depend on a specific chip:
//!
//! - Configuration types with validation and binary persistence
//! - Link supervision state machine (re-initialize on repeated failures)
//! - Idle scheduling with optional low-power entry
//! - Burn-in avoidance for static text

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod placement;
pub mod power;
pub mod state;

pub use config::{ConfigError, EngineConfig, IdleConfig, JiggleConfig, CONFIG_VERSION};
pub use placement::{Jiggle, XorShift32};
pub use power::IdlePowerScheduler;
pub use state::{LinkEvent, LinkMonitor, LinkState};
