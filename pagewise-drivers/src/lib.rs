//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pagewise-hal:
//!
//! - Software two-wire (I2C) master built on open-drain GPIO lines

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;

pub use bus::{BusState, SoftI2c};
