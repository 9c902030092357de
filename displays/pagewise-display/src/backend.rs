//! Display backend trait
//!
//! Defines the pixel-level interface shared by the refresh engine and the
//! text helpers.

use crate::flusher::FlushReport;
use crate::geometry::{text_bounds_at, Rect, TextOffset};
use crate::text::GlyphSource;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Geometry does not fit the backing buffer
    BufferOverflow,
    /// Zero-sized or oversized panel geometry
    InvalidGeometry,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Communication => f.write_str("display communication failed"),
            Self::InvalidCoordinates => f.write_str("invalid coordinates"),
            Self::NotInitialized => f.write_str("display not initialized"),
            Self::BufferOverflow => f.write_str("geometry exceeds frame buffer"),
            Self::InvalidGeometry => f.write_str("invalid panel geometry"),
        }
    }
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for rendering to monochrome
/// paged displays. Every mutation is expected to record its own dirty
/// region so that [`flush`](Self::flush) only ships what changed.
pub trait DisplayBackend {
    /// Set or clear a single pixel; off-screen writes are ignored
    fn set_pixel(&mut self, x: i32, y: i32, on: bool);

    /// Set or clear every pixel of `rect` clipped to the display
    fn fill_rect(&mut self, rect: Rect, on: bool);

    /// Clear `rect`, returning the clipped area that was cleared
    fn clear_region(&mut self, rect: Rect) -> Rect {
        let (w, h) = self.dimensions();
        match rect.clamp_to(i32::from(w), i32::from(h)) {
            Some(area) => {
                self.fill_rect(area, false);
                area
            }
            None => Rect::EMPTY,
        }
    }

    /// Draw `text` bottom-anchored at `pos`, returning its bounds
    ///
    /// Nothing is drawn when the bounds are invalid.
    fn draw_text<G: GlyphSource>(&mut self, glyphs: &G, text: &str, pos: TextOffset) -> Rect {
        let (w, h) = self.dimensions();
        let bounds = text_bounds_at(
            pos,
            glyphs.text_width(text),
            glyphs.char_height(),
            i32::from(w),
            i32::from(h),
        );
        if bounds.is_valid() {
            glyphs.render(text, pos, &mut |x, y| self.set_pixel(x, y, true));
        }
        bounds
    }

    /// Clear the entire display
    fn clear(&mut self);

    /// Send changed regions to the hardware
    fn flush(&mut self) -> FlushReport;

    /// Get the display dimensions in pixels
    ///
    /// Returns (width, height)
    fn dimensions(&self) -> (u16, u16);

    /// Check if the display is ready
    fn is_ready(&self) -> bool;
}
