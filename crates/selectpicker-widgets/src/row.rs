//! Row descriptors: one logical entry of the flattened menu list.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Kind of menu row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RowKind {
    /// A selectable option
    #[default]
    Option,
    /// A separator between groups
    Divider,
    /// The heading of an option group
    GroupLabel,
}

/// Identity of a rendered row element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// The visual node materialized for a row.
///
/// The id survives re-renders of the same descriptor; only the markup and
/// state flags are patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowElement {
    pub id: ElementId,
    pub markup: String,
    /// Rendered selected state (may briefly lag the descriptor while a
    /// rejected selection is being reverted)
    pub selected: bool,
    pub active: bool,
    pub disabled: bool,
    pub mounted: bool,
    /// Number of in-place patches since creation
    pub patches: u32,
}

/// One row of the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDescriptor {
    pub kind: RowKind,
    pub display_text: String,
    pub sub_text: Option<String>,
    /// Extra search-matchable strings
    pub tokens: Vec<String>,
    pub icon: Option<String>,
    /// Free-form rich content replacing the text when shown
    pub content: Option<String>,
    /// Text used on the button instead of `display_text`
    pub title: Option<String>,
    /// Join key with the native option (options only)
    pub value: String,
    pub selected: bool,
    pub disabled: bool,
    /// Enclosing group, 1-based (lookup only)
    pub group_id: Option<usize>,
    /// Per-group selection limit (group labels only)
    pub group_max: Option<usize>,
    pub height_px: f32,
    /// Top edge within the list
    pub offset_px: f32,
    pub focusable: bool,
    /// 1-based ordinal among focusable rows
    pub pos_in_set: usize,
    /// Position of the authoritative copy in the main sequence
    pub data_index: usize,
    /// Content has already been through the sanitizer
    pub sanitized: bool,
    pub element: Option<RowElement>,
}

impl Default for RowDescriptor {
    fn default() -> Self {
        Self {
            kind: RowKind::Option,
            display_text: String::new(),
            sub_text: None,
            tokens: Vec::new(),
            icon: None,
            content: None,
            title: None,
            value: String::new(),
            selected: false,
            disabled: false,
            group_id: None,
            group_max: None,
            height_px: 0.0,
            offset_px: 0.0,
            focusable: false,
            pos_in_set: 0,
            data_index: 0,
            sanitized: false,
            element: None,
        }
    }
}

impl RowDescriptor {
    /// An option row.
    pub fn option(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: RowKind::Option,
            value: value.into(),
            display_text: text.into(),
            ..Self::default()
        }
    }

    /// A divider row.
    pub fn divider() -> Self {
        Self {
            kind: RowKind::Divider,
            ..Self::default()
        }
    }

    /// A group label row.
    pub fn group_label(label: impl Into<String>, group_id: usize) -> Self {
        Self {
            kind: RowKind::GroupLabel,
            display_text: label.into(),
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    /// Bottom edge within the list.
    pub fn bottom_px(&self) -> f32 {
        self.offset_px + self.height_px
    }

    pub const fn is_option(&self) -> bool {
        matches!(self.kind, RowKind::Option)
    }

    pub const fn is_divider(&self) -> bool {
        matches!(self.kind, RowKind::Divider)
    }

    /// Text shown on the button for this row.
    pub fn button_text(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.display_text)
    }
}

/// Rows of the option run belonging to `group_id`.
///
/// Group members are contiguous by construction, so the run is found by
/// scanning for the first member and extending while membership holds.
pub fn group_members(rows: &[RowDescriptor], group_id: usize) -> Range<usize> {
    let member = |r: &RowDescriptor| r.is_option() && r.group_id == Some(group_id);
    let Some(start) = rows.iter().position(member) else {
        return 0..0;
    };
    let len = rows[start..].iter().take_while(|&r| member(r)).count();
    start..start + len
}

/// The label row of `group_id`, if present.
pub fn group_label_of(rows: &[RowDescriptor], group_id: usize) -> Option<&RowDescriptor> {
    rows.iter()
        .find(|r| r.kind == RowKind::GroupLabel && r.group_id == Some(group_id))
}
