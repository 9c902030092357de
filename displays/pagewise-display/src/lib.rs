//! Incremental refresh for paged monochrome displays
//!
//! This crate provides:
//! - `FrameBuffer`: 1-bit page-addressed pixel storage in controller layout
//! - `DirtyTracker`: per-page changed column ranges
//! - `DisplayFlusher`: windowed partial writes over any `I2cBus`
//! - `DisplayEngine`: the three above behind one owner, usable as an
//!   `embedded-graphics` draw target
//! - Text placement helpers for moving a reading around the panel
//!
//! # Architecture
//!
//! Drawing never touches the bus. Each drawing call updates the frame
//! buffer and widens the dirty range of every page it touched. A flush
//! then sends, for each dirty page, one address window and one data
//! write covering only the changed columns.
//!
//! ## Supported Controllers
//!
//! - **SSD1306**: column/page range windows (`0x21`/`0x22`)
//! - **SH1106**: page + column pointer with a RAM column offset

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod dirty;
pub mod engine;
pub mod flusher;
pub mod framebuffer;
pub mod geometry;
pub mod text;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use config::PanelConfig;
pub use controller::Controller;
pub use dirty::{DirtyPage, DirtyTracker, PageSpan};
pub use engine::{reset_panel, DisplayEngine, FlushStats};
pub use flusher::{DisplayFlusher, FlushReport};
pub use framebuffer::{buffer_size, FrameBuffer, PageGeometry, MAX_COLUMNS, MAX_PAGES};
pub use geometry::{clamp, text_bounds_at, Rect, TextOffset};
pub use text::{clamp_offset_x, random_offset, GlyphSource, MonoGlyphs, TextSlot};
