//! Text placement
//!
//! Glyph rasterization lives behind [`GlyphSource`]; this module only
//! decides where text goes and which region must be erased when it moves.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::backend::DisplayBackend;
use crate::geometry::{text_bounds_at, Rect, TextOffset};

/// Source of rasterized text
pub trait GlyphSource {
    /// Height of one line in pixels
    fn char_height(&self) -> i32;

    /// Width of `text` in pixels
    fn text_width(&self, text: &str) -> i32;

    /// Call `plot` for every lit pixel of `text` with its bottom row at `pos.y`
    fn render(&self, text: &str, pos: TextOffset, plot: &mut dyn FnMut(i32, i32));
}

/// Glyphs from an `embedded-graphics` mono font
pub struct MonoGlyphs<'a> {
    style: MonoTextStyle<'a, BinaryColor>,
}

impl<'a> MonoGlyphs<'a> {
    pub fn new(font: &'a MonoFont<'a>) -> Self {
        Self {
            style: MonoTextStyle::new(font, BinaryColor::On),
        }
    }
}

/// Adapts a plot callback to a draw target
struct Plotter<'p> {
    plot: &'p mut dyn FnMut(i32, i32),
}

impl OriginDimensions for Plotter<'_> {
    fn size(&self) -> Size {
        Size::new(u32::from(u16::MAX), u32::from(u16::MAX))
    }
}

impl DrawTarget for Plotter<'_> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on() {
                (self.plot)(point.x, point.y);
            }
        }
        Ok(())
    }
}

impl GlyphSource for MonoGlyphs<'_> {
    fn char_height(&self) -> i32 {
        self.style.font.character_size.height as i32
    }

    fn text_width(&self, text: &str) -> i32 {
        let count = text.chars().count() as u32;
        if count == 0 {
            return 0;
        }
        let font = self.style.font;
        let width = count * font.character_size.width + (count - 1) * font.character_spacing;
        width as i32
    }

    fn render(&self, text: &str, pos: TextOffset, plot: &mut dyn FnMut(i32, i32)) {
        let mut target = Plotter { plot };
        let origin = Point::new(pos.x, pos.y);
        // Plotter never fails
        let _ = Text::with_baseline(text, origin, self.style, Baseline::Bottom).draw(&mut target);
    }
}

/// Keep text fully on screen horizontally
pub fn clamp_offset_x(pos: TextOffset, text_width: i32, display_width: i32) -> TextOffset {
    let width = text_width.min(display_width);
    let max_x = (display_width - width).max(0);
    TextOffset::new(pos.x.min(max_x), pos.y)
}

/// Random on-screen anchor, used to move static text around
///
/// `below(n)` must return a value in `0..n`. The anchor row is picked so
/// the whole line stays visible.
pub fn random_offset(
    below: &mut impl FnMut(u32) -> u32,
    text_width: i32,
    char_height: i32,
    display_width: i32,
    display_height: i32,
) -> TextOffset {
    let width = text_width.min(display_width);
    let max_x = (display_width - width).max(0);
    let x = below(max_x as u32 + 1) as i32;

    let min_y = char_height;
    let mut max_y = display_height - 1;
    if max_y <= min_y {
        max_y = min_y + 1;
    }
    let y = min_y + below((max_y - min_y) as u32) as i32;

    TextOffset::new(x, y)
}

/// One line of text that is erased and redrawn when it changes
///
/// Texts longer than `N` bytes are not remembered and so are redrawn on
/// every update.
#[derive(Debug, Clone, Default)]
pub struct TextSlot<const N: usize> {
    text: heapless::String<N>,
    pos: TextOffset,
    bounds: Rect,
}

impl<const N: usize> TextSlot<N> {
    pub fn new() -> Self {
        Self {
            text: heapless::String::new(),
            pos: TextOffset::default(),
            bounds: Rect::EMPTY,
        }
    }

    /// Area currently covered by the text
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Show `text` at `pos`
    ///
    /// Returns `false` without touching the display if the same text is
    /// already drawn there. Otherwise the old bounds are cleared and the
    /// new text drawn; text that would be invisible just clears the slot.
    pub fn update<D, G>(&mut self, display: &mut D, glyphs: &G, text: &str, pos: TextOffset) -> bool
    where
        D: DisplayBackend,
        G: GlyphSource,
    {
        let (w, h) = display.dimensions();
        let bounds = text_bounds_at(
            pos,
            glyphs.text_width(text),
            glyphs.char_height(),
            i32::from(w),
            i32::from(h),
        );
        if bounds.is_valid() && self.text.as_str() == text && self.pos == pos {
            return false;
        }

        if self.bounds.is_valid() {
            display.clear_region(self.bounds);
        }

        self.text.clear();
        if bounds.is_valid() {
            self.bounds = display.draw_text(glyphs, text, pos);
            self.pos = pos;
            if self.text.push_str(text).is_err() {
                self.text.clear();
            }
        } else {
            self.bounds = Rect::EMPTY;
            self.pos = TextOffset::default();
        }
        true
    }

    /// Erase the text and forget it
    pub fn clear<D: DisplayBackend>(&mut self, display: &mut D) {
        if self.bounds.is_valid() {
            display.clear_region(self.bounds);
        }
        *self = Self::new();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X18};

    #[test]
    fn test_mono_metrics() {
        let glyphs = MonoGlyphs::new(&FONT_9X18);
        assert_eq!(glyphs.char_height(), 18);
        assert_eq!(glyphs.text_width("21.5C"), 45);
        assert_eq!(glyphs.text_width(""), 0);
    }

    #[test]
    fn test_mono_render_is_bottom_anchored() {
        let glyphs = MonoGlyphs::new(&FONT_6X10);
        let mut min_y = i32::MAX;
        let mut max_y = i32::MIN;
        let mut min_x = i32::MAX;
        let mut max_x = i32::MIN;
        glyphs.render("H", TextOffset::new(4, 20), &mut |x, y| {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        });

        // Every lit pixel falls inside the character cell
        assert!(min_y >= 11 && max_y <= 20);
        assert!(min_x >= 4 && max_x < 10);
        assert!(min_y <= max_y);
    }

    #[test]
    fn test_clamp_offset_x() {
        let pos = clamp_offset_x(TextOffset::new(120, 20), 45, 128);
        assert_eq!(pos, TextOffset::new(83, 20));

        let pos = clamp_offset_x(TextOffset::new(10, 20), 45, 128);
        assert_eq!(pos, TextOffset::new(10, 20));

        // Wider than the display pins to the left edge
        let pos = clamp_offset_x(TextOffset::new(30, 20), 200, 128);
        assert_eq!(pos, TextOffset::new(0, 20));
    }

    #[test]
    fn test_random_offset_ranges() {
        let mut max = |n: u32| n - 1;
        let pos = random_offset(&mut max, 45, 18, 128, 32);
        assert_eq!(pos, TextOffset::new(83, 30));

        let mut min = |_n: u32| 0;
        let pos = random_offset(&mut min, 45, 18, 128, 32);
        assert_eq!(pos, TextOffset::new(0, 18));
    }

    #[test]
    fn test_random_offset_tall_font() {
        // Font taller than the panel still yields a usable row
        let mut calls = std::vec::Vec::new();
        let mut below = |n: u32| {
            calls.push(n);
            0
        };
        let pos = random_offset(&mut below, 10, 40, 128, 32);
        assert_eq!(pos, TextOffset::new(0, 40));
        assert_eq!(calls, vec![119, 1]);
    }
}
