//! Position index: pixel offsets and focusability for a row sequence.

use selectpicker_core::{row_at_offset, ItemLayout};

use crate::layout::SizeInfo;
use crate::row::RowDescriptor;

/// Direction of keyboard travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Cumulative bottom edges and the focusable bitmap of one sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionIndex {
    bottoms: Vec<f32>,
    focusable: Vec<bool>,
}

impl PositionIndex {
    /// Assign height, offset, focusability and set position to every row in
    /// a single forward pass, and index the result.
    pub fn reindex(rows: &mut [RowDescriptor], sizes: &SizeInfo) -> Self {
        let mut bottoms = Vec::with_capacity(rows.len());
        let mut focusable = Vec::with_capacity(rows.len());
        let mut offset = 0.0_f32;
        let mut pos = 0;

        for row in rows.iter_mut() {
            row.height_px = sizes.row_height(row.kind);
            row.offset_px = offset;
            row.focusable = row.is_option() && !row.disabled;
            if row.focusable {
                pos += 1;
                row.pos_in_set = pos;
            } else {
                row.pos_in_set = 0;
            }
            offset += row.height_px;
            bottoms.push(offset);
            focusable.push(row.focusable);
        }

        Self { bottoms, focusable }
    }

    /// Cumulative bottom edge of each row.
    pub fn bottoms(&self) -> &[f32] {
        &self.bottoms
    }

    pub fn len(&self) -> usize {
        self.bottoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottoms.is_empty()
    }

    /// Height of the whole sequence.
    pub fn total_height(&self) -> f32 {
        self.bottoms.last().copied().unwrap_or(0.0)
    }

    pub fn is_focusable(&self, index: usize) -> bool {
        self.focusable.get(index).copied().unwrap_or(false)
    }

    /// Number of focusable rows.
    pub fn focusable_count(&self) -> usize {
        self.focusable.iter().filter(|&&f| f).count()
    }

    /// Vertical extent of row `index`.
    pub fn item_layout(&self, index: usize) -> Option<ItemLayout> {
        let bottom = *self.bottoms.get(index)?;
        let top = if index == 0 { 0.0 } else { self.bottoms[index - 1] };
        Some(ItemLayout::new(top, bottom - top))
    }

    /// Row under pixel offset `y`.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        row_at_offset(&self.bottoms, y)
    }

    pub fn first_focusable(&self) -> Option<usize> {
        self.focusable.iter().position(|&f| f)
    }

    pub fn last_focusable(&self) -> Option<usize> {
        self.focusable.iter().rposition(|&f| f)
    }

    /// First focusable row at or beyond `start` in `dir`, without wrapping.
    /// Falls back to the last focusable row in that direction.
    pub fn focusable_from(&self, start: usize, dir: Direction) -> Option<usize> {
        let len = self.focusable.len();
        if len == 0 {
            return None;
        }
        let start = start.min(len - 1);
        match dir {
            Direction::Down => (start..len)
                .find(|&i| self.focusable[i])
                .or_else(|| self.last_focusable()),
            Direction::Up => (0..=start)
                .rev()
                .find(|&i| self.focusable[i])
                .or_else(|| self.first_focusable()),
        }
    }

    /// Nearest focusable row from `from` in `dir`, wrapping at the ends.
    ///
    /// With no current row, Down starts at the top and Up at the bottom.
    pub fn next_focusable(&self, from: Option<usize>, dir: Direction) -> Option<usize> {
        let len = self.focusable.len();
        if len == 0 {
            return None;
        }
        let Some(start) = from.filter(|&i| i < len) else {
            return match dir {
                Direction::Down => self.first_focusable(),
                Direction::Up => self.last_focusable(),
            };
        };
        (1..=len)
            .map(|step| match dir {
                Direction::Down => (start + step) % len,
                Direction::Up => (start + len - step) % len,
            })
            .find(|&i| self.focusable[i])
    }
}
