//! Notifications emitted by the picker.

use serde::{Deserialize, Serialize};

/// What changed in one selection mutation.
///
/// Built by the mutation itself and carried on the notification; nothing is
/// stashed between calls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetail {
    /// Main-sequence index of the clicked row, for click-driven changes
    pub clicked_index: Option<usize>,
    /// New selected state of the clicked row
    pub is_selected: Option<bool>,
    /// Selected values before the change
    pub previous_value: Vec<String>,
    /// Selected values after the change
    pub value: Vec<String>,
}

/// A transient "limit reached" message shown in the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitNotice {
    pub text: String,
    /// Group the limit belongs to; `None` for the global limit
    pub group_id: Option<usize>,
}

/// Text shown on the picker button.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonText {
    pub text: String,
    /// Tooltip listing the selected texts
    pub title: Option<String>,
    /// True when nothing is selected and the placeholder text is shown
    pub placeholder: bool,
}

/// Fire-and-forget notifications, drained with `SelectPicker::drain_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickerEvent {
    Initialized,
    Rendered { button: ButtonText },
    Changed(ChangeDetail),
    Refreshed,
    MaxReached { limit: usize, notice: String },
    MaxReachedGroup { group_id: usize, limit: usize, notice: String },
    Loaded {
        page: usize,
        items: usize,
        has_more: bool,
        total: Option<usize>,
    },
    Shown,
    Hidden,
}

impl PickerEvent {
    pub const fn is_change(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}
