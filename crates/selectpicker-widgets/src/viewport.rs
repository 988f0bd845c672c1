//! Viewport window controller.
//!
//! Decides which rows are mounted for the current scroll position and keeps
//! the mounted run in sync with that decision. A recomputation that yields
//! the same range touches nothing.

use std::ops::Range;

use selectpicker_core::{ChunkedWindow, VirtualScroll, VisibleSlice};

use crate::render::{PickerView, RowRenderer};
use crate::row::{ElementId, RowDescriptor};

/// The rows currently mounted in the menu, with their spacer margins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MountedRun {
    pub range: Range<usize>,
    pub elements: Vec<ElementId>,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

/// Chunked windowing over the current row sequence.
#[derive(Debug, Clone)]
pub struct ViewportController {
    window: ChunkedWindow,
    policy: VirtualScroll,
    /// A paged source always windows, whatever the row count
    forced: bool,
    scroll_top: f32,
    viewport_height: f32,
    slice: VisibleSlice,
    run: MountedRun,
    remounts: u64,
}

impl ViewportController {
    pub fn new(chunk_size: usize, policy: VirtualScroll, forced: bool) -> Self {
        Self {
            window: ChunkedWindow::new(chunk_size),
            policy,
            forced,
            scroll_top: 0.0,
            viewport_height: 0.0,
            slice: VisibleSlice::full(0, false),
            run: MountedRun::default(),
            remounts: 0,
        }
    }

    /// Apply new settings after a refresh. The next update always remounts.
    pub fn configure(&mut self, chunk_size: usize, policy: VirtualScroll, forced: bool) {
        self.window = ChunkedWindow::new(chunk_size);
        self.policy = policy;
        self.forced = forced;
    }

    /// Whether a sequence of `len` rows is windowed.
    pub const fn is_virtual(&self, len: usize) -> bool {
        self.forced || self.policy.is_enabled(len)
    }

    pub const fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub const fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
    }

    pub const fn slice(&self) -> &VisibleSlice {
        &self.slice
    }

    pub const fn mounted(&self) -> &MountedRun {
        &self.run
    }

    /// Number of times the mounted run was rebuilt.
    pub const fn remounts(&self) -> u64 {
        self.remounts
    }

    /// Forget the mounted range; required whenever the sequence is replaced
    /// or reindexed.
    pub fn reset(&mut self) {
        self.window.reset();
    }

    /// Compute the slice for `scroll_top` and remount if it changed.
    pub fn on_scroll(
        &mut self,
        rows: &mut [RowDescriptor],
        bottoms: &[f32],
        scroll_top: f32,
        renderer: &mut RowRenderer,
        view: &PickerView,
        active: Option<usize>,
    ) -> VisibleSlice {
        self.scroll_top = scroll_top.max(0.0);
        let slice = if self.is_virtual(bottoms.len()) {
            self.window
                .update(bottoms, self.scroll_top, self.viewport_height)
        } else {
            self.window.mount_all(bottoms.len())
        };
        if slice.changed {
            self.remount(rows, &slice, renderer, view, active);
        }
        self.slice = slice.clone();
        slice
    }

    /// Whether the viewport reached the end of what has been fetched.
    pub fn wants_more(&self, len: usize, has_more: bool) -> bool {
        has_more && self.is_virtual(len) && (len == 0 || self.slice.reaches_last_chunk())
    }

    fn remount(
        &mut self,
        rows: &mut [RowDescriptor],
        slice: &VisibleSlice,
        renderer: &mut RowRenderer,
        view: &PickerView,
        active: Option<usize>,
    ) {
        let old = std::mem::take(&mut self.run.range);
        for i in old {
            if !slice.range.contains(&i) {
                if let Some(row) = rows.get_mut(i) {
                    RowRenderer::release(row);
                }
            }
        }
        let end = slice.range.end.min(rows.len());
        let start = slice.range.start.min(end);
        let elements = rows[start..end]
            .iter_mut()
            .enumerate()
            .map(|(offset, row)| renderer.materialize(row, view, active == Some(start + offset)))
            .collect();
        self.run = MountedRun {
            range: start..end,
            elements,
            margin_top: slice.margin_top,
            margin_bottom: slice.margin_bottom,
        };
        self.remounts += 1;
        tracing::debug!(
            message = "remounted menu rows",
            first = start,
            last = end,
            margin_top = slice.margin_top,
            margin_bottom = slice.margin_bottom,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::default_allow_list;
    use crate::layout::SizeInfo;
    use crate::position::PositionIndex;
    use crate::render::{BootstrapTemplates, EscapeSanitizer};
    use proptest::prelude::*;

    fn rows(n: usize) -> (Vec<RowDescriptor>, PositionIndex) {
        let mut rows: Vec<RowDescriptor> = (0..n)
            .map(|i| RowDescriptor::option(format!("v{i}"), format!("Item {i}")))
            .collect();
        let idx = PositionIndex::reindex(&mut rows, &SizeInfo::default());
        (rows, idx)
    }

    fn renderer() -> RowRenderer {
        RowRenderer::new(
            Box::new(BootstrapTemplates),
            Box::new(EscapeSanitizer),
            true,
            default_allow_list(),
        )
    }

    #[test]
    fn test_small_list_mounts_everything() {
        let (mut rows, idx) = rows(10);
        let mut vp = ViewportController::new(40, VirtualScroll::default(), false);
        vp.set_viewport_height(100.0);
        let slice = vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut renderer(), &PickerView::default(), None);
        assert_eq!(slice.range, 0..10);
        assert_eq!(vp.mounted().elements.len(), 10);
        assert!(!vp.is_virtual(10));
    }

    #[test]
    fn test_large_list_windows() {
        let (mut rows, idx) = rows(1000);
        let mut vp = ViewportController::new(40, VirtualScroll::default(), false);
        vp.set_viewport_height(320.0);
        let mut r = renderer();
        let slice = vp.on_scroll(&mut rows, idx.bottoms(), 100.0 * 32.0, &mut r, &PickerView::default(), None);
        // row 100 is in chunk 2; mount chunks 1..=3
        assert_eq!(slice.range, 40..160);
        assert_eq!(slice.margin_top, 40.0 * 32.0);
        assert_eq!(slice.margin_bottom, (1000.0 - 160.0) * 32.0);
        assert_eq!(vp.mounted().elements.len(), 120);
        assert!(rows[39].element.is_none());
    }

    #[test]
    fn test_same_scroll_is_noop() {
        let (mut rows, idx) = rows(1000);
        let mut vp = ViewportController::new(40, VirtualScroll::Always, false);
        vp.set_viewport_height(320.0);
        let mut r = renderer();
        let view = PickerView::default();
        vp.on_scroll(&mut rows, idx.bottoms(), 5000.0, &mut r, &view, None);
        let created = r.created();
        let second = vp.on_scroll(&mut rows, idx.bottoms(), 5000.0, &mut r, &view, None);
        assert!(!second.changed);
        assert_eq!(vp.remounts(), 1);
        assert_eq!(r.created(), created);
    }

    #[test]
    fn test_scrolling_releases_rows_leaving_window() {
        let (mut rows, idx) = rows(1000);
        let mut vp = ViewportController::new(40, VirtualScroll::Always, false);
        vp.set_viewport_height(320.0);
        let mut r = renderer();
        let view = PickerView::default();
        vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut r, &view, None);
        assert!(rows[0].element.as_ref().unwrap().mounted);
        vp.on_scroll(&mut rows, idx.bottoms(), 20_000.0, &mut r, &view, None);
        assert!(!rows[0].element.as_ref().unwrap().mounted);
    }

    #[test]
    fn test_reset_forces_remount() {
        let (mut rows, idx) = rows(100);
        let mut vp = ViewportController::new(40, VirtualScroll::Never, false);
        let mut r = renderer();
        let view = PickerView::default();
        vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut r, &view, None);
        vp.reset();
        vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut r, &view, None);
        assert_eq!(vp.remounts(), 2);
    }

    #[test]
    fn test_wants_more_only_at_end() {
        let (mut rows, idx) = rows(200);
        let mut vp = ViewportController::new(40, VirtualScroll::Never, true);
        vp.set_viewport_height(320.0);
        let mut r = renderer();
        let view = PickerView::default();
        assert!(vp.is_virtual(200));
        vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut r, &view, None);
        assert!(!vp.wants_more(200, true));
        vp.on_scroll(&mut rows, idx.bottoms(), 190.0 * 32.0, &mut r, &view, None);
        assert!(vp.wants_more(200, true));
        assert!(!vp.wants_more(200, false));
    }

    #[test]
    fn test_active_row_flagged() {
        let (mut rows, idx) = rows(5);
        let mut vp = ViewportController::new(40, VirtualScroll::default(), false);
        vp.on_scroll(&mut rows, idx.bottoms(), 0.0, &mut renderer(), &PickerView::default(), Some(2));
        assert!(rows[2].element.as_ref().unwrap().active);
        assert!(!rows[1].element.as_ref().unwrap().active);
    }

    proptest! {
        #[test]
        fn prop_mounted_span_covers_viewport(
            n in 1usize..3000,
            scroll in 0.0f32..100_000.0,
            height in 0.0f32..2000.0,
        ) {
            let (mut rows, idx) = rows(n);
            let mut vp = ViewportController::new(40, VirtualScroll::Always, false);
            vp.set_viewport_height(height);
            let slice = vp.on_scroll(&mut rows, idx.bottoms(), scroll, &mut renderer(), &PickerView::default(), None);
            let total = idx.total_height();
            let top = scroll.min(total);
            let bottom = (top + height).min(total);
            let span_top = slice.margin_top;
            let span_bottom = total - slice.margin_bottom;
            prop_assert!(span_top <= top);
            prop_assert!(span_bottom >= bottom);
        }
    }
}
