//! Pagewise Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the display engine is built on.
//! Board support code implements them once per chip; everything above
//! this crate stays board-agnostic and runs on the host under test.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pagewise-display / pagewise-core       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pagewise-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pagewise-     │       │ board crate   │
//! │ drivers       │       │ (firmware)    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OpenDrainPin`] - Open-drain line used by the bit-banged bus
//! - [`i2c::I2cBus`] - Two-wire master operations
//! - [`power::ClockController`] - Low-power entry/exit around idle sleeps

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod power;

// Re-export key traits at crate root for convenience
pub use gpio::{OpenDrain, OpenDrainPin};
pub use i2c::{BusError, I2cBus, I2cConfig};
pub use power::{ClockController, LowPowerMode, NoLowPower};
