//! Viewport mapping between trace-index space and a fixed-width raster.
//!
//! A [`ZoomWindow`] is a half-open index range `[start, end)` projected onto
//! `width` columns. All mapping is pure; the window itself never mutates
//! shared state, callers replace it wholesale.
//!
//! Stale windows are legal inputs: the trace grows (live) or gets reloaded
//! underneath the window, so every read path goes through
//! [`ZoomWindow::normalized`], which repairs anything degenerate to the full
//! range instead of erroring.

/// Scroll-wheel zoom factor per notch.
pub const ZOOM_FACTOR: f64 = 1.3;

/// Smallest span scroll-zoom will narrow to.
pub const MIN_SPAN: usize = 10;

/// Pointer travel below this many columns is a click, not a drag.
pub const DRAG_THRESHOLD: u16 = 4;

/// Smallest index span a drag-zoom is accepted at.
pub const MIN_DRAG_SPAN: usize = 2;

/// Range queries are sampled at `width * OVERSAMPLE` for anti-aliasing.
pub const OVERSAMPLE: usize = 2;

/// The `{0, 0}` default is degenerate and reads as the full range through
/// [`ZoomWindow::normalized`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoomWindow {
    pub start: usize,
    pub end: usize,
}

impl ZoomWindow {
    #[must_use]
    pub fn full(trace_len: usize) -> Self {
        Self {
            start: 0,
            end: trace_len,
        }
    }

    /// Repair against the current trace length: empty, inverted or
    /// out-of-range windows read as the full range.
    #[must_use]
    pub fn normalized(self, trace_len: usize) -> Self {
        if self.start >= self.end || self.end > trace_len {
            Self::full(trace_len)
        } else {
            self
        }
    }

    #[must_use]
    pub fn span(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_full(&self, trace_len: usize) -> bool {
        self.normalized(trace_len) == Self::full(trace_len)
    }

    /// Forward map: raster column of `index`, `None` outside the window.
    #[must_use]
    pub fn column_of(&self, index: usize, width: u16, trace_len: usize) -> Option<u16> {
        let w = self.normalized(trace_len);
        if index < w.start || index >= w.end || w.span() == 0 {
            return None;
        }
        let frac = (index - w.start) as f64 / w.span() as f64;
        let col = (frac * f64::from(width)) as u16;
        Some(col.min(width.saturating_sub(1)))
    }

    /// Inverse map: trace index under raster column `px`, rounded and
    /// clamped into the window (and into `[0, trace_len)`).
    #[must_use]
    pub fn index_at(&self, px: u16, width: u16, trace_len: usize) -> usize {
        let w = self.normalized(trace_len);
        if trace_len == 0 || width == 0 {
            return 0;
        }
        let frac = f64::from(px) / f64::from(width);
        let raw = w.start as f64 + frac * w.span() as f64;
        let idx = raw.round() as usize;
        idx.clamp(w.start, w.end.saturating_sub(1).min(trace_len - 1))
    }

    /// Zoom into the dragged column range. Floor the left edge, ceil the
    /// right, and accept only when at least [`MIN_DRAG_SPAN`] indices remain.
    #[must_use]
    pub fn drag_zoom(&self, px0: u16, px1: u16, width: u16, trace_len: usize) -> Option<Self> {
        let w = self.normalized(trace_len);
        if trace_len == 0 || width == 0 {
            return None;
        }
        let (lo, hi) = if px0 <= px1 { (px0, px1) } else { (px1, px0) };
        let span = w.span() as f64;
        let left = w.start as f64 + f64::from(lo) / f64::from(width) * span;
        let right = w.start as f64 + f64::from(hi) / f64::from(width) * span;
        let start = left.floor() as usize;
        let end = (right.ceil() as usize).min(trace_len);
        if end.saturating_sub(start) >= MIN_DRAG_SPAN {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// One scroll-wheel notch at column `px`. The index under the pointer
    /// keeps its on-screen fraction; at the edges the window shifts instead
    /// of shrinking.
    #[must_use]
    pub fn scroll_zoom(&self, px: u16, width: u16, trace_len: usize, zoom_in: bool) -> Self {
        let w = self.normalized(trace_len);
        if trace_len == 0 || width == 0 {
            return w;
        }
        let span = w.span() as f64;
        let factor = if zoom_in {
            1.0 / ZOOM_FACTOR
        } else {
            ZOOM_FACTOR
        };
        let new_span = (span * factor)
            .round()
            .clamp(MIN_SPAN.min(trace_len) as f64, trace_len as f64)
            as usize;

        let frac = f64::from(px) / f64::from(width);
        let anchor = w.start as f64 + frac * span;
        let mut start = (anchor - frac * new_span as f64).round().max(0.0) as usize;
        if start + new_span > trace_len {
            start = trace_len - new_span;
        }
        Self {
            start,
            end: start + new_span,
        }
    }

    /// Minimap extent as `(start, end)` fractions of the full trace, only
    /// when the window is narrower than the full range.
    #[must_use]
    pub fn minimap(&self, trace_len: usize) -> Option<(f64, f64)> {
        let w = self.normalized(trace_len);
        if trace_len == 0 || w.is_full(trace_len) {
            return None;
        }
        Some((
            w.start as f64 / trace_len as f64,
            w.end as f64 / trace_len as f64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_reads_as_full_range() {
        assert_eq!(ZoomWindow::default().normalized(100), ZoomWindow::full(100));
        assert!(ZoomWindow::default().normalized(100).is_full(100));
    }

    #[test]
    fn test_normalized_repairs_degenerate_windows() {
        assert_eq!(
            ZoomWindow { start: 5, end: 5 }.normalized(100),
            ZoomWindow::full(100)
        );
        assert_eq!(
            ZoomWindow { start: 9, end: 3 }.normalized(100),
            ZoomWindow::full(100)
        );
        // Stale window after the trace shrank (reload)
        assert_eq!(
            ZoomWindow { start: 10, end: 500 }.normalized(100),
            ZoomWindow::full(100)
        );
        // Valid windows pass through untouched
        let w = ZoomWindow { start: 10, end: 50 };
        assert_eq!(w.normalized(100), w);
    }

    #[test]
    fn test_inverse_map_clamps_into_window() {
        let w = ZoomWindow { start: 20, end: 60 };
        assert_eq!(w.index_at(0, 100, 100), 20);
        assert_eq!(w.index_at(99, 100, 100), 59);
        assert!(w.index_at(50, 100, 100) >= 20);
        assert!(w.index_at(50, 100, 100) < 60);
    }

    #[test]
    fn test_drag_zoom_contains_dragged_range_and_rejects_tiny() {
        let w = ZoomWindow::full(1000);
        let zoomed = w.drag_zoom(10, 20, 100, 1000).unwrap();
        // Floor/ceil means the dragged range is fully contained.
        assert!(zoomed.start <= 100);
        assert!(zoomed.end >= 200);
        assert!(zoomed.end <= 1000);

        // A drag spanning less than two indices is rejected.
        let narrow = ZoomWindow { start: 500, end: 501 };
        assert_eq!(narrow.drag_zoom(10, 90, 100, 1000), None);
    }

    #[test]
    fn test_scroll_zoom_anchors_pointer_index() {
        let len = 10_000;
        let w = ZoomWindow::full(len);
        let px = 30;
        let width = 100;
        let before = w.index_at(px, width, len);
        let zoomed = w.scroll_zoom(px, width, len, true);
        let after = zoomed.index_at(px, width, len);
        // The index under the pointer stays within one column's worth.
        let col_indices = zoomed.span() / usize::from(width) + 1;
        assert!(before.abs_diff(after) <= col_indices);
        assert!(zoomed.span() < w.span());
    }

    #[test]
    fn test_scroll_zoom_clamps_span_and_shifts_at_edges() {
        let len = 1000;
        // Zooming in bottoms out at MIN_SPAN.
        let mut w = ZoomWindow::full(len);
        for _ in 0..100 {
            w = w.scroll_zoom(50, 100, len, true);
        }
        assert_eq!(w.span(), MIN_SPAN);

        // Zooming out from the right edge shifts, never overflows.
        let edge = ZoomWindow {
            start: 980,
            end: 1000,
        };
        let out = edge.scroll_zoom(99, 100, len, false);
        assert!(out.end <= len);
        assert!(out.span() > edge.span());

        // Zooming out far past full clamps to the full range.
        let mut v = ZoomWindow {
            start: 400,
            end: 600,
        };
        for _ in 0..20 {
            v = v.scroll_zoom(50, 100, len, false);
        }
        assert_eq!(v, ZoomWindow::full(len));
    }

    #[test]
    fn test_minimap_only_when_zoomed() {
        assert_eq!(ZoomWindow::full(100).minimap(100), None);
        let (lo, hi) = ZoomWindow { start: 25, end: 75 }.minimap(100).unwrap();
        assert!((lo - 0.25).abs() < f64::EPSILON);
        assert!((hi - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_trace_is_inert() {
        let w = ZoomWindow::full(0);
        assert_eq!(w.index_at(50, 100, 0), 0);
        assert_eq!(w.drag_zoom(0, 99, 100, 0), None);
        assert_eq!(w.scroll_zoom(50, 100, 0, true), w);
        assert_eq!(w.minimap(0), None);
    }
}
