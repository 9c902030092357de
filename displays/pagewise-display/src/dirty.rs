//! Per-page dirty tracking
//!
//! Each page keeps the smallest column interval covering every change
//! made to it since it was last flushed. Ranges only ever widen until the
//! flusher drains them.

use crate::framebuffer::{PageGeometry, MAX_PAGES};
use crate::geometry::Rect;

/// Changed column range of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyPage {
    pub active: bool,
    /// First changed column; meaningless while inactive
    pub min_x: u16,
    /// Last changed column (inclusive)
    pub max_x: u16,
}

impl DirtyPage {
    const CLEAN: Self = Self {
        active: false,
        min_x: 0,
        max_x: 0,
    };

    fn widen(&mut self, x0: u16, x1: u16) {
        if !self.active {
            *self = Self {
                active: true,
                min_x: x0,
                max_x: x1,
            };
            return;
        }
        self.min_x = self.min_x.min(x0);
        self.max_x = self.max_x.max(x1);
    }
}

/// Column range of one page that must be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageSpan {
    pub page: u8,
    pub start: u16,
    /// Inclusive
    pub end: u16,
}

impl PageSpan {
    /// Number of columns in the span
    pub fn columns(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }
}

/// Dirty state for every page of a display
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    geometry: PageGeometry,
    pages: [DirtyPage; MAX_PAGES],
}

impl DirtyTracker {
    /// Create a clean tracker for a validated geometry
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: [DirtyPage::CLEAN; MAX_PAGES],
        }
    }

    fn page_count(&self) -> usize {
        self.geometry.pages().min(MAX_PAGES)
    }

    /// Record that `rect` changed
    ///
    /// Invalid or fully off-screen rects are ignored; partially visible
    /// ones are clipped first.
    pub fn mark_rect(&mut self, rect: Rect) {
        let bounds = self.geometry.bounds();
        let Some(area) = rect.intersect(&bounds) else {
            return;
        };

        // Clipped to a geometry of at most 256x64, so the casts are lossless
        let x0 = area.x as u16;
        let x1 = (area.right() - 1) as u16;
        let first = (area.y / 8) as usize;
        let last = ((area.bottom() - 1) / 8) as usize;

        for page in &mut self.pages[first..=last.min(MAX_PAGES - 1)] {
            page.widen(x0, x1);
        }
    }

    pub fn mark_pixel(&mut self, x: i32, y: i32) {
        self.mark_rect(Rect::new(x, y, 1, 1));
    }

    /// Mark the whole display dirty
    pub fn mark_all(&mut self) {
        self.mark_rect(self.geometry.bounds());
    }

    /// Check if nothing needs sending
    pub fn is_clean(&self) -> bool {
        self.pages[..self.page_count()].iter().all(|p| !p.active)
    }

    /// Dirty state of one page
    pub fn page(&self, index: usize) -> Option<&DirtyPage> {
        self.pages[..self.page_count()].get(index)
    }

    /// Forget every pending change
    pub fn reset(&mut self) {
        self.pages = [DirtyPage::CLEAN; MAX_PAGES];
    }

    /// Drain active pages in ascending order
    ///
    /// Each page is reset as it is yielded. Pages not yet reached when the
    /// iterator is dropped stay dirty.
    pub fn take_active_pages(&mut self) -> ActivePages<'_> {
        ActivePages {
            tracker: self,
            next: 0,
        }
    }
}

/// Draining iterator returned by [`DirtyTracker::take_active_pages`]
pub struct ActivePages<'a> {
    tracker: &'a mut DirtyTracker,
    next: usize,
}

impl Iterator for ActivePages<'_> {
    type Item = PageSpan;

    fn next(&mut self) -> Option<PageSpan> {
        let count = self.tracker.page_count();
        let last_col = self.tracker.geometry.width.saturating_sub(1);

        while self.next < count {
            let index = self.next;
            self.next += 1;

            let page = &mut self.tracker.pages[index];
            if !page.active {
                continue;
            }

            let start = page.min_x.min(last_col);
            let end = page.max_x.clamp(start, last_col);
            *page = DirtyPage::CLEAN;

            return Some(PageSpan {
                page: index as u8,
                start,
                end,
            });
        }
        None
    }
}
