//! Rectangle algebra
//!
//! Pure coordinate math used by dirty tracking and partial redraw. All
//! coordinates are in pixels; a rect with a non-positive width or height
//! covers nothing and is never drawn, cleared or marked.

use heapless::Vec;

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Anchor for a text draw; `y` is the bottom pixel row of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextOffset {
    pub x: i32,
    pub y: i32,
}

impl TextOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer clamp; the caller guarantees `lo <= hi`
pub const fn clamp(v: i32, lo: i32, hi: i32) -> i32 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

impl Rect {
    /// Empty rect (covers nothing)
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if the rect covers any pixels
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// First column past the right edge
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// First row past the bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if a pixel lies inside the rect
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.is_valid() && x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rects
    ///
    /// `None` if either rect is invalid or they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }

        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Parts of `self` not covered by `keep`
    ///
    /// Returns up to four strips (top, bottom, left, right) around the
    /// intersection. If the rects do not overlap, `self` is returned
    /// unchanged; an invalid `self` yields nothing.
    pub fn subtract(&self, keep: &Rect) -> Vec<Rect, 4> {
        let mut out = Vec::new();
        if !self.is_valid() {
            return out;
        }

        let Some(inner) = self.intersect(keep) else {
            // Capacity is 4, a single push cannot fail
            let _ = out.push(*self);
            return out;
        };

        let strips = [
            // Top: full width above the intersection
            Rect::new(self.x, self.y, self.width, inner.y - self.y),
            // Bottom: full width below the intersection
            Rect::new(
                self.x,
                inner.bottom(),
                self.width,
                self.bottom() - inner.bottom(),
            ),
            // Left: beside the intersection
            Rect::new(self.x, inner.y, inner.x - self.x, inner.height),
            // Right: beside the intersection
            Rect::new(
                inner.right(),
                inner.y,
                self.right() - inner.right(),
                inner.height,
            ),
        ];

        for strip in strips.into_iter().filter(Rect::is_valid) {
            let _ = out.push(strip);
        }
        out
    }

    /// Clip to a `width` x `height` display
    pub fn clamp_to(&self, width: i32, height: i32) -> Option<Rect> {
        self.intersect(&Rect::new(0, 0, width, height))
    }
}

/// Bounding box of a text draw anchored at `pos`
///
/// The box is clipped horizontally to the display and vertically so the
/// top never goes above row 0. Returns [`Rect::EMPTY`] if there is no
/// text width or the anchor sits at or past the right edge.
pub fn text_bounds_at(
    pos: TextOffset,
    text_width: i32,
    char_height: i32,
    display_width: i32,
    display_height: i32,
) -> Rect {
    if text_width <= 0 || display_width <= 0 || display_height <= 0 || pos.x >= display_width {
        return Rect::EMPTY;
    }

    let x = clamp(pos.x, 0, display_width - 1);
    let width = text_width.min(display_width - x);
    if width <= 0 {
        return Rect::EMPTY;
    }

    let bottom = clamp(pos.y, 0, display_height - 1);
    let top = (bottom - char_height + 1).max(0);

    Rect::new(x, top, width, bottom - top + 1)
}
