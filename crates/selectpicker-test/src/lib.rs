#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::new_without_default)]
#![allow(clippy::cast_precision_loss)]
//! Test harness for the select picker.
//!
//! - [`PickerHarness`] drives a picker through the same input events a host
//!   event loop would deliver, and collects what it emits.
//! - [`fixtures`] provides recording collaborators (probe, data source,
//!   sanitizer, toggle) whose logs stay readable after the picker takes
//!   ownership of them, plus ready-made native selects.

pub mod fixtures;
pub mod harness;

pub use fixtures::{
    grouped_select, numbered_select, Catalog, FixedProbe, RecordingSanitizer, RecordingSource,
    RecordingToggle, SourceLog, ToggleLog,
};
pub use harness::PickerHarness;
