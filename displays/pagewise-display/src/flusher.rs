//! Partial display updates
//!
//! Turns dirty page spans into windowed controller writes. Every active
//! page costs one command transaction (the address window) and one data
//! transaction (`0x40` followed by the span's column bytes).
//!
//! Transfer failures are not retried. A page whose window or data write
//! fails is counted in [`FlushReport::pages_failed`], logged, and treated
//! as clean; the next change to that page sends it again.

use pagewise_hal::{BusError, I2cBus};

use crate::controller::{Controller, CONTROL_COMMAND, CONTROL_DATA};
use crate::dirty::{DirtyTracker, PageSpan};
use crate::framebuffer::{FrameBuffer, MAX_COLUMNS};

/// Outcome of one flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushReport {
    /// Pages whose window and data were both acknowledged
    pub pages_sent: u8,
    /// Pages dropped after a bus error
    pub pages_failed: u8,
}

impl FlushReport {
    /// Check if nothing was sent or attempted
    pub fn is_empty(&self) -> bool {
        self.pages_sent == 0 && self.pages_failed == 0
    }
}

/// Ships dirty pages over a serial bus
pub struct DisplayFlusher<B> {
    bus: B,
    address: u8,
    controller: Controller,
    /// Control byte plus one page of columns
    xfer: [u8; MAX_COLUMNS + 1],
}

impl<B: I2cBus<Error = BusError>> DisplayFlusher<B> {
    pub fn new(bus: B, address: u8, controller: Controller) -> Self {
        Self {
            bus,
            address,
            controller,
            xfer: [0; MAX_COLUMNS + 1],
        }
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Send a command stream
    ///
    /// Long streams are split into several transactions.
    pub fn send_commands(&mut self, commands: &[u8]) -> Result<(), BusError> {
        for chunk in commands.chunks(MAX_COLUMNS) {
            self.xfer[0] = CONTROL_COMMAND;
            self.xfer[1..=chunk.len()].copy_from_slice(chunk);
            self.bus.write(self.address, &self.xfer[..=chunk.len()])?;
        }
        Ok(())
    }

    /// Send display RAM data at the current window
    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        if data.is_empty() {
            return Ok(());
        }
        let len = data.len().min(MAX_COLUMNS);
        self.xfer[0] = CONTROL_DATA;
        self.xfer[1..=len].copy_from_slice(&data[..len]);
        self.bus.write(self.address, &self.xfer[..=len])
    }

    fn send_page<const N: usize>(
        &mut self,
        span: PageSpan,
        framebuffer: &FrameBuffer<N>,
    ) -> Result<(), BusError> {
        let window = self.controller.window(span.page, span.start, span.end);
        self.send_commands(&window)?;

        // Spans come from a tracker sharing the buffer geometry
        let bytes = framebuffer
            .page_bytes(
                usize::from(span.page),
                usize::from(span.start),
                usize::from(span.end),
            )
            .unwrap_or_default();
        self.send_data(bytes)
    }

    /// Send every dirty page and reset the tracker
    pub fn flush<const N: usize>(
        &mut self,
        tracker: &mut DirtyTracker,
        framebuffer: &FrameBuffer<N>,
    ) -> FlushReport {
        let mut report = FlushReport::default();

        for span in tracker.take_active_pages() {
            match self.send_page(span, framebuffer) {
                Ok(()) => report.pages_sent += 1,
                Err(_e) => {
                    report.pages_failed += 1;
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "page {} cols {}..={} dropped: {}",
                        span.page,
                        span.start,
                        span.end,
                        _e
                    );
                }
            }
        }

        #[cfg(feature = "defmt")]
        if !report.is_empty() {
            defmt::debug!(
                "flush: {} sent, {} failed",
                report.pages_sent,
                report.pages_failed
            );
        }

        report
    }

    /// Write raw RAM data at the current window
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        data.chunks(MAX_COLUMNS)
            .try_for_each(|chunk| self.send_data(chunk))
    }

    pub fn release(self) -> B {
        self.bus
    }
}


#[cfg(test)]
mod tests {
    use super::mock::RecordingBus;
    use super::*;
    use crate::framebuffer::{buffer_size, PageGeometry};
    use crate::geometry::Rect;

    const SIZE: usize = buffer_size(128, 32);

    fn setup() -> (DirtyTracker, FrameBuffer<SIZE>) {
        let geometry = PageGeometry::new(128, 32).unwrap();
        (DirtyTracker::new(geometry), FrameBuffer::new(geometry).unwrap())
    }

    #[test]
    fn test_flush_sends_window_then_data() {
        let (mut tracker, mut fb) = setup();
        let mut flusher = DisplayFlusher::new(RecordingBus::default(), 0x3C, Controller::Ssd1306);

        fb.fill_rect(Rect::new(10, 8, 3, 2), true);
        tracker.mark_rect(Rect::new(10, 8, 3, 2));

        let report = flusher.flush(&mut tracker, &fb);
        assert_eq!(
            report,
            FlushReport {
                pages_sent: 1,
                pages_failed: 0
            }
        );

        let bus = flusher.release();
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[0], (0x3C, vec![0x00, 0x21, 10, 12, 0x22, 1, 1]));
        assert_eq!(bus.writes[1], (0x3C, vec![0x40, 0x03, 0x03, 0x03]));
    }

    #[test]
    fn test_second_flush_is_silent() {
        let (mut tracker, mut fb) = setup();
        let mut flusher = DisplayFlusher::new(RecordingBus::default(), 0x3C, Controller::Ssd1306);

        fb.set_pixel(0, 0, true);
        tracker.mark_all();
        assert_eq!(flusher.flush(&mut tracker, &fb).pages_sent, 4);

        let before = flusher.bus.writes.len();
        let report = flusher.flush(&mut tracker, &fb);
        assert!(report.is_empty());
        assert_eq!(flusher.bus.writes.len(), before);
    }

    #[test]
    fn test_failed_page_is_dropped() {
        let (mut tracker, fb) = setup();
        // Second write is page 0's data
        let bus = RecordingBus::failing_at(1);
        let mut flusher = DisplayFlusher::new(bus, 0x3C, Controller::Ssd1306);

        tracker.mark_rect(Rect::new(0, 0, 4, 16));
        let report = flusher.flush(&mut tracker, &fb);
        assert_eq!(
            report,
            FlushReport {
                pages_sent: 1,
                pages_failed: 1
            }
        );
        assert!(tracker.is_clean());

        // Page 1 still went out in full
        let bus = flusher.release();
        assert_eq!(bus.command_writes().last(), Some(&&[0x21, 0, 3, 0x22, 1, 1][..]));
        assert_eq!(bus.data_writes(), vec![&[0u8, 0, 0, 0][..]]);
    }

    #[test]
    fn test_failed_window_skips_data() {
        let (mut tracker, fb) = setup();
        let mut flusher =
            DisplayFlusher::new(RecordingBus::failing_at(0), 0x3C, Controller::Ssd1306);

        tracker.mark_pixel(5, 5);
        let report = flusher.flush(&mut tracker, &fb);
        assert_eq!(report.pages_failed, 1);
        assert!(flusher.bus.writes.is_empty());
    }

    #[test]
    fn test_sh1106_window() {
        let (mut tracker, mut fb) = setup();
        let controller = Controller::Sh1106 { column_offset: 2 };
        let mut flusher = DisplayFlusher::new(RecordingBus::default(), 0x3D, controller);

        fb.set_pixel(20, 31, true);
        tracker.mark_pixel(20, 31);
        flusher.flush(&mut tracker, &fb);

        let bus = flusher.release();
        assert_eq!(bus.writes[0], (0x3D, vec![0x00, 0xB3, 0x06, 0x11]));
        assert_eq!(bus.writes[1], (0x3D, vec![0x40, 0x80]));
    }

    #[test]
    fn test_long_command_stream_is_chunked() {
        let mut flusher = DisplayFlusher::new(RecordingBus::default(), 0x3C, Controller::Ssd1306);
        let stream = [0xE3u8; MAX_COLUMNS + 10];
        flusher.send_commands(&stream).unwrap();

        let bus = flusher.release();
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[0].1.len(), MAX_COLUMNS + 1);
        assert_eq!(bus.writes[1].1.len(), 11);
    }

    #[test]
    fn test_write_data_chunks() {
        let mut flusher = DisplayFlusher::new(RecordingBus::default(), 0x3C, Controller::Ssd1306);
        flusher.write_data(&[0xAA; 300]).unwrap();
        flusher.write_data(&[]).unwrap();

        let bus = flusher.release();
        assert_eq!(bus.data_writes().len(), 2);
        assert_eq!(bus.data_writes()[1].len(), 300 - MAX_COLUMNS);
    }
}
