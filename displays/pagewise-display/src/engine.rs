//! Incremental refresh engine
//!
//! Owns the frame buffer, its dirty tracker and the flusher. Every drawing
//! call records the area it touched, and [`DisplayEngine::flush`] sends
//! just those columns of just those pages.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Pixel, Size},
    primitives::Rectangle,
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use pagewise_hal::{BusError, I2cBus};

use crate::backend::{DisplayBackend, DisplayError};
use crate::config::PanelConfig;
use crate::controller::Controller;
use crate::dirty::DirtyTracker;
use crate::flusher::{DisplayFlusher, FlushReport};
use crate::framebuffer::{FrameBuffer, PageGeometry};
use crate::geometry::{text_bounds_at, Rect, TextOffset};
use crate::text::GlyphSource;

/// Cumulative transfer counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    /// Flushes that had at least one dirty page
    pub flushes: u32,
    pub pages_sent: u32,
    pub pages_failed: u32,
}

impl FlushStats {
    fn record(&mut self, report: FlushReport) {
        if report.is_empty() {
            return;
        }
        self.flushes = self.flushes.wrapping_add(1);
        self.pages_sent = self.pages_sent.wrapping_add(u32::from(report.pages_sent));
        self.pages_failed = self
            .pages_failed
            .wrapping_add(u32::from(report.pages_failed));
    }
}

/// Display engine
///
/// `N` is the frame buffer capacity in bytes, see
/// [`buffer_size`](crate::framebuffer::buffer_size).
pub struct DisplayEngine<B, const N: usize> {
    config: PanelConfig,
    framebuffer: FrameBuffer<N>,
    dirty: DirtyTracker,
    flusher: DisplayFlusher<B>,
    initialized: bool,
    stats: FlushStats,
}

impl<B: I2cBus<Error = BusError>, const N: usize> DisplayEngine<B, N> {
    /// Create an engine; nothing is sent until [`init`](Self::init)
    pub fn new(bus: B, config: PanelConfig) -> Result<Self, DisplayError> {
        let geometry = config.geometry()?;
        let framebuffer = FrameBuffer::new(geometry)?;

        Ok(Self {
            config,
            framebuffer,
            dirty: DirtyTracker::new(geometry),
            flusher: DisplayFlusher::new(bus, config.address, config.controller),
            initialized: false,
            stats: FlushStats::default(),
        })
    }

    /// Configure the controller and schedule a full redraw
    ///
    /// May be called again to recover a panel that lost power.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let geometry = self.geometry();
        let seq = self
            .config
            .controller
            .init_sequence(geometry, self.config.contrast);

        if let Err(_e) = self.flusher.send_commands(&seq) {
            self.initialized = false;
            #[cfg(feature = "defmt")]
            defmt::warn!("display init failed: {}", _e);
            return Err(DisplayError::Communication);
        }

        self.framebuffer.clear();
        self.dirty.mark_all();
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "display {}x{} ready at {=u8:#x}",
            geometry.width,
            geometry.height,
            self.config.address
        );

        Ok(())
    }

    pub fn geometry(&self) -> PageGeometry {
        self.framebuffer.geometry()
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn framebuffer(&self) -> &FrameBuffer<N> {
        &self.framebuffer
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn width(&self) -> i32 {
        i32::from(self.geometry().width)
    }

    fn height(&self) -> i32 {
        i32::from(self.geometry().height)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.framebuffer.set_pixel(x, y, on);
        self.dirty.mark_pixel(x, y);
    }

    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        self.framebuffer.fill_rect(rect, on);
        self.dirty.mark_rect(rect);
    }

    /// Clear `rect`, returning the clipped area
    pub fn clear_region(&mut self, rect: Rect) -> Rect {
        let Some(area) = rect.clamp_to(self.width(), self.height()) else {
            return Rect::EMPTY;
        };
        self.fill_rect(area, false);
        area
    }

    /// Draw `text` bottom-anchored at `pos`, returning its bounds
    ///
    /// Only lit pixels are written; clear the area first when replacing
    /// text. The whole bounds are marked dirty.
    pub fn draw_text<G: GlyphSource>(&mut self, glyphs: &G, text: &str, pos: TextOffset) -> Rect {
        let bounds = text_bounds_at(
            pos,
            glyphs.text_width(text),
            glyphs.char_height(),
            self.width(),
            self.height(),
        );
        if !bounds.is_valid() {
            return bounds;
        }

        let fb = &mut self.framebuffer;
        glyphs.render(text, pos, &mut |x, y| fb.set_pixel(x, y, true));
        self.dirty.mark_rect(bounds);
        bounds
    }

    /// Blank the buffer; the whole panel is resent on the next flush
    pub fn clear(&mut self) {
        self.framebuffer.clear();
        self.dirty.mark_all();
    }

    /// Resend everything on the next flush
    pub fn invalidate(&mut self) {
        self.dirty.mark_all();
    }

    /// Send changed pages
    ///
    /// Before [`init`](Self::init) succeeds nothing is sent and changes
    /// stay pending.
    pub fn flush(&mut self) -> FlushReport {
        if !self.initialized {
            return FlushReport::default();
        }
        let report = self.flusher.flush(&mut self.dirty, &self.framebuffer);
        self.stats.record(report);
        report
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.flusher
            .send_commands(bytes)
            .map_err(|_| DisplayError::Communication)
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.command(&Controller::set_contrast(contrast))?;
        self.config.contrast = contrast;
        Ok(())
    }

    /// Turn display on/off
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.command(&Controller::set_display_on(on))
    }

    /// Invert display colors
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.command(&Controller::set_inverted(inverted))
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.flusher.release()
    }
}

impl<B: I2cBus<Error = BusError>, const N: usize> DisplayBackend for DisplayEngine<B, N> {
    fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        DisplayEngine::set_pixel(self, x, y, on);
    }

    fn fill_rect(&mut self, rect: Rect, on: bool) {
        DisplayEngine::fill_rect(self, rect, on);
    }

    fn clear_region(&mut self, rect: Rect) -> Rect {
        DisplayEngine::clear_region(self, rect)
    }

    fn draw_text<G: GlyphSource>(&mut self, glyphs: &G, text: &str, pos: TextOffset) -> Rect {
        DisplayEngine::draw_text(self, glyphs, text, pos)
    }

    fn clear(&mut self) {
        DisplayEngine::clear(self);
    }

    fn flush(&mut self) -> FlushReport {
        DisplayEngine::flush(self)
    }

    fn dimensions(&self) -> (u16, u16) {
        let geometry = self.geometry();
        (geometry.width, geometry.height)
    }

    fn is_ready(&self) -> bool {
        self.initialized
    }
}

impl<B: I2cBus<Error = BusError>, const N: usize> OriginDimensions for DisplayEngine<B, N> {
    fn size(&self) -> Size {
        let geometry = self.geometry();
        Size::new(u32::from(geometry.width), u32::from(geometry.height))
    }
}

impl<B: I2cBus<Error = BusError>, const N: usize> DrawTarget for DisplayEngine<B, N> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            DisplayEngine::set_pixel(self, point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let rect = Rect::new(
            area.top_left.x,
            area.top_left.y,
            area.size.width.min(i32::MAX as u32) as i32,
            area.size.height.min(i32::MAX as u32) as i32,
        );
        DisplayEngine::fill_rect(self, rect, color.is_on());
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let bounds = self.geometry().bounds();
        DisplayEngine::fill_rect(self, bounds, color.is_on());
        Ok(())
    }
}

/// Pulse a panel's reset line
///
/// High, low, high with 100 ms before each edge.
pub fn reset_panel<P, D>(pin: &mut P, delay: &mut D) -> Result<(), P::Error>
where
    P: OutputPin,
    D: DelayNs,
{
    delay.delay_ms(100);
    pin.set_high()?;
    delay.delay_ms(100);
    pin.set_low()?;
    delay.delay_ms(100);
    pin.set_high()
}
