// Scroll Virtualization - chunked windowing for long option lists
//
// Provides:
// - Pixel offset to row index translation over cumulative row edges
// - Fixed-size index chunks with one chunk of slack on each side
// - Top/bottom spacer margins so the scrollbar matches the full list
// - Change detection so an unchanged window never remounts
// - Scroll-into-view targets for keyboard navigation

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default number of rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 40;

/// Default row count at which virtualization turns on.
pub const DEFAULT_VIRTUAL_THRESHOLD: usize = 600;

/// When the window controller virtualizes.
///
/// Deserializes from a number (threshold) or a boolean (always/never).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVirtualScroll", into = "RawVirtualScroll")]
pub enum VirtualScroll {
    /// Virtualize once the row count meets or exceeds this value
    Threshold(usize),
    /// Always virtualize
    Always,
    /// Never virtualize, every row stays mounted
    Never,
}

impl Default for VirtualScroll {
    fn default() -> Self {
        Self::Threshold(DEFAULT_VIRTUAL_THRESHOLD)
    }
}

impl VirtualScroll {
    /// Whether a list of `row_count` rows is windowed.
    #[must_use]
    pub const fn is_enabled(self, row_count: usize) -> bool {
        match self {
            Self::Threshold(threshold) => row_count >= threshold,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawVirtualScroll {
    Flag(bool),
    Count(usize),
    /// Anything else keeps the default threshold
    Other(serde_json::Value),
}

impl From<RawVirtualScroll> for VirtualScroll {
    fn from(raw: RawVirtualScroll) -> Self {
        match raw {
            RawVirtualScroll::Flag(true) => Self::Always,
            RawVirtualScroll::Flag(false) => Self::Never,
            RawVirtualScroll::Count(n) => Self::Threshold(n),
            RawVirtualScroll::Other(_) => Self::default(),
        }
    }
}

impl From<VirtualScroll> for RawVirtualScroll {
    fn from(v: VirtualScroll) -> Self {
        match v {
            VirtualScroll::Always => Self::Flag(true),
            VirtualScroll::Never => Self::Flag(false),
            VirtualScroll::Threshold(n) => Self::Count(n),
        }
    }
}

/// Item layout information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLayout {
    /// Y position of the item's top edge
    pub y: f32,
    /// Height of the item
    pub height: f32,
}

impl ItemLayout {
    pub const fn new(y: f32, height: f32) -> Self {
        Self { y, height }
    }

    /// Get the bottom edge of this item
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Scroll alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align item to start of viewport
    Start,
    /// Align item to end of viewport
    End,
    /// Only scroll if item not fully visible
    Auto,
}

/// Compute the scroll offset that brings `item` into a viewport of
/// `viewport_height` currently scrolled to `scroll`.
///
/// Returns `None` when `Auto` alignment needs no movement.
pub fn scroll_target(
    item: ItemLayout,
    align: ScrollAlign,
    scroll: f32,
    viewport_height: f32,
) -> Option<f32> {
    let target = match align {
        ScrollAlign::Start => item.y,
        ScrollAlign::End => item.bottom() - viewport_height,
        ScrollAlign::Auto => {
            if item.y < scroll {
                item.y
            } else if item.bottom() > scroll + viewport_height {
                item.bottom() - viewport_height
            } else {
                return None;
            }
        }
    };
    Some(target.max(0.0))
}

/// Index of the row covering pixel `y`, given cumulative bottom edges.
///
/// `bottoms[i]` is the bottom edge of row `i` (monotonically
/// non-decreasing). Offsets past the end map to the last row.
pub fn row_at_offset(bottoms: &[f32], y: f32) -> Option<usize> {
    if bottoms.is_empty() {
        return None;
    }
    let idx = bottoms.partition_point(|&b| b <= y);
    Some(idx.min(bottoms.len() - 1))
}

/// Fixed-size partition of `0..len` into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunks {
    len: usize,
    size: usize,
}

impl Chunks {
    /// Partition `len` rows into chunks of `size` rows (minimum 1).
    pub fn new(len: usize, size: usize) -> Self {
        Self {
            len,
            size: size.max(1),
        }
    }

    /// Number of chunks (zero for an empty list).
    pub const fn count(&self) -> usize {
        self.len.div_ceil(self.size)
    }

    /// Chunk containing row `index`.
    pub const fn chunk_of(&self, index: usize) -> usize {
        index / self.size
    }

    /// Row range of chunk `chunk`, clamped to the list.
    pub fn range(&self, chunk: usize) -> Range<usize> {
        let start = (chunk * self.size).min(self.len);
        let end = ((chunk + 1) * self.size).min(self.len);
        start..end
    }
}

/// The slice of rows to keep mounted, with spacer margins.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSlice {
    /// Mounted rows, `[first, last)`
    pub range: Range<usize>,
    /// Chunk containing the scroll top
    pub current_chunk: usize,
    /// Chunk containing the viewport bottom
    pub bottom_chunk: usize,
    /// Total number of chunks
    pub chunk_count: usize,
    /// Height of the unmounted rows above the slice
    pub margin_top: f32,
    /// Height of the unmounted rows below the slice
    pub margin_bottom: f32,
    /// Whether the range differs from the previously mounted one
    pub changed: bool,
}

impl VisibleSlice {
    /// A slice that mounts every row.
    pub fn full(len: usize, changed: bool) -> Self {
        Self {
            range: 0..len,
            current_chunk: 0,
            bottom_chunk: 0,
            chunk_count: usize::from(len > 0),
            margin_top: 0.0,
            margin_bottom: 0.0,
            changed,
        }
    }

    /// Whether the viewport has reached the final chunk of the list.
    pub const fn reaches_last_chunk(&self) -> bool {
        self.chunk_count > 0 && self.bottom_chunk + 1 >= self.chunk_count
    }

    /// Number of mounted rows.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// True when nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Chunked window state: remembers the mounted range so unchanged
/// recomputations can be skipped.
#[derive(Debug, Clone, Default)]
pub struct ChunkedWindow {
    chunk_size: usize,
    mounted: Option<Range<usize>>,
}

impl ChunkedWindow {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            mounted: None,
        }
    }

    /// Rows per chunk.
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The last mounted range, if any.
    pub fn mounted(&self) -> Option<Range<usize>> {
        self.mounted.clone()
    }

    /// Forget the mounted range; the next update always reports a change.
    pub fn reset(&mut self) {
        self.mounted = None;
    }

    /// Compute the slice for `scroll_top` without recording it.
    pub fn plan(&self, bottoms: &[f32], scroll_top: f32, viewport_height: f32) -> VisibleSlice {
        let len = bottoms.len();
        let chunks = Chunks::new(len, self.chunk_size);
        let Some(total) = bottoms.last().copied() else {
            return VisibleSlice {
                range: 0..0,
                current_chunk: 0,
                bottom_chunk: 0,
                chunk_count: 0,
                margin_top: 0.0,
                margin_bottom: 0.0,
                changed: self.mounted.as_ref().is_some_and(|r| !r.is_empty()),
            };
        };

        let top = scroll_top.clamp(0.0, total);
        let top_row = row_at_offset(bottoms, top).unwrap_or(0);
        let bottom_edge = top + viewport_height.max(0.0);
        let bottom_row = bottoms.partition_point(|&b| b < bottom_edge).min(len - 1);

        let current_chunk = chunks.chunk_of(top_row);
        let bottom_chunk = chunks.chunk_of(bottom_row).max(current_chunk);
        let first_chunk = current_chunk.saturating_sub(1);
        let last_chunk = (bottom_chunk + 1).min(chunks.count() - 1);

        let first = chunks.range(first_chunk).start;
        let last = chunks.range(last_chunk).end;

        let margin_top = if first == 0 { 0.0 } else { bottoms[first - 1] };
        let margin_bottom = total - bottoms[last - 1];

        VisibleSlice {
            changed: self.mounted.as_ref() != Some(&(first..last)),
            range: first..last,
            current_chunk,
            bottom_chunk,
            chunk_count: chunks.count(),
            margin_top,
            margin_bottom,
        }
    }

    /// Compute the slice for `scroll_top` and record it as mounted.
    pub fn update(&mut self, bottoms: &[f32], scroll_top: f32, viewport_height: f32) -> VisibleSlice {
        let slice = self.plan(bottoms, scroll_top, viewport_height);
        self.mounted = Some(slice.range.clone());
        slice
    }

    /// Record a full mount of `len` rows (non-virtual mode).
    pub fn mount_all(&mut self, len: usize) -> VisibleSlice {
        let changed = self.mounted.as_ref() != Some(&(0..len));
        self.mounted = Some(0..len);
        VisibleSlice::full(len, changed)
    }
}
