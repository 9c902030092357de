//! Bus drivers
//!
//! Supports one transport:
//! - Soft I2C: two-wire master clocked entirely by GPIO toggling

mod soft_i2c;

#[cfg(test)]
mod sim;

pub use soft_i2c::{BusState, SoftI2c};
