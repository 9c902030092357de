//! Page-addressed 1-bit frame buffer
//!
//! Rows are grouped into 8-pixel-tall pages. The byte at
//! `page * width + x` holds the eight rows of that page at column `x`,
//! bit `n` being row `page * 8 + n`. This is the layout the controller
//! expects on the wire, so pages can be shipped without repacking.

use crate::backend::DisplayError;
use crate::geometry::Rect;

/// Widest panel supported (column bytes per page)
pub const MAX_COLUMNS: usize = 256;

/// Most pages supported (64 rows, the controllers' multiplex limit)
pub const MAX_PAGES: usize = 8;

/// Buffer size for a `width` x `height` panel
pub const fn buffer_size(width: usize, height: usize) -> usize {
    width * height.div_ceil(8)
}

/// Panel size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    pub width: u16,
    pub height: u16,
}

impl PageGeometry {
    /// Validated geometry
    pub const fn new(width: u16, height: u16) -> Result<Self, DisplayError> {
        let geometry = Self { width, height };
        if geometry.is_valid() {
            Ok(geometry)
        } else {
            Err(DisplayError::InvalidGeometry)
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.width as usize <= MAX_COLUMNS
            && self.pages() <= MAX_PAGES
    }

    /// Number of 8-row pages, rounding up
    pub const fn pages(&self) -> usize {
        (self.height as usize).div_ceil(8)
    }

    /// Bytes needed to back this geometry
    pub const fn buffer_len(&self) -> usize {
        buffer_size(self.width as usize, self.height as usize)
    }

    /// Whole display as a rect
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// Bits of one page byte covering rows `lo..=hi` (page-relative)
const fn row_mask(lo: i32, hi: i32) -> u8 {
    ((0xFFu16 << lo) & (0xFFu16 >> (7 - hi))) as u8
}

/// Fixed-capacity frame buffer
///
/// `N` is the backing capacity in bytes; the geometry chosen at runtime
/// must fit in it.
#[derive(Debug, Clone)]
pub struct FrameBuffer<const N: usize> {
    geometry: PageGeometry,
    buf: [u8; N],
}

impl<const N: usize> FrameBuffer<N> {
    /// Create a cleared buffer
    pub fn new(geometry: PageGeometry) -> Result<Self, DisplayError> {
        if !geometry.is_valid() {
            return Err(DisplayError::InvalidGeometry);
        }
        if geometry.buffer_len() > N {
            return Err(DisplayError::BufferOverflow);
        }

        Ok(Self {
            geometry,
            buf: [0; N],
        })
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn width(&self) -> i32 {
        i32::from(self.geometry.width)
    }

    fn height(&self) -> i32 {
        i32::from(self.geometry.height)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some((y / 8) as usize * self.geometry.width as usize + x as usize)
    }

    /// Set or clear one pixel; off-screen coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let bit = 1u8 << (y % 8);
        if on {
            self.buf[idx] |= bit;
        } else {
            self.buf[idx] &= !bit;
        }
    }

    /// Pixel state, `None` when off-screen
    pub fn pixel(&self, x: i32, y: i32) -> Option<bool> {
        let idx = self.index(x, y)?;
        Some(self.buf[idx] & (1 << (y % 8)) != 0)
    }

    /// Stored bytes for the inclusive column range of one page
    pub fn page_bytes(&self, page: usize, col_start: usize, col_end: usize) -> Option<&[u8]> {
        let width = self.geometry.width as usize;
        if page >= self.geometry.pages() || col_start > col_end || col_end >= width {
            return None;
        }
        let base = page * width;
        self.buf.get(base + col_start..=base + col_end)
    }

    /// Set or clear every pixel of `rect`
    ///
    /// Only the bits of rows inside `rect` change; the other rows sharing
    /// a page byte are left alone.
    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        let Some(area) = rect.clamp_to(self.width(), self.height()) else {
            return;
        };

        let width = self.geometry.width as usize;
        let (x0, x1) = (area.x as usize, (area.right() - 1) as usize);
        let (y0, y1) = (area.y, area.bottom() - 1);

        for page in (y0 / 8)..=(y1 / 8) {
            let top = page * 8;
            let mask = row_mask(y0.max(top) - top, y1.min(top + 7) - top);
            let base = page as usize * width;
            for byte in &mut self.buf[base + x0..=base + x1] {
                if on {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
        }
    }

    /// Clear every pixel of `rect`
    pub fn clear_rect(&mut self, rect: Rect) {
        self.fill_rect(rect, false);
    }

    /// Clear the whole buffer
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Raw bytes in wire layout
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.geometry.buffer_len()]
    }
}
