//! Core types and traits for the select picker.
//!
//! This crate provides the foundational pieces the widget crate builds on:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Input events: [`Event`], [`Key`], [`MouseButton`]
//! - The headless [`Widget`] trait
//! - Chunked windowing math: [`virtualization`]
//! - Configuration errors: [`PickerError`]

mod error;
mod event;
mod geometry;
pub mod virtualization;
pub mod widget;

pub use error::{PickerError, PickerResult};
pub use event::{Event, Key, MouseButton};
pub use geometry::{Point, Rect, Size};
pub use virtualization::{
    row_at_offset, scroll_target, ChunkedWindow, Chunks, ItemLayout, ScrollAlign, VirtualScroll,
    VisibleSlice,
};
pub use widget::{AccessibleRole, LayoutResult, TypeId, Widget};
