//! Widget trait and related types.
//!
//! A widget here is headless: it owns state, is told where it sits on screen,
//! reacts to input, and reports what happened as typed messages. Producing
//! markup or pixels is left to collaborators.
//!
//! # Examples
//!
//! ```
//! use selectpicker_core::TypeId;
//!
//! assert_ne!(TypeId::of::<String>(), TypeId::of::<i32>());
//! ```

use crate::event::Event;
use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Type identifier for widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(std::any::TypeId);

impl TypeId {
    /// Get the type ID for a type.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self(std::any::TypeId::of::<T>())
    }
}

/// Result of laying out a widget.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutResult {
    /// Computed size after layout
    pub size: Size,
}

/// Accessible roles the picker exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessibleRole {
    /// No specific role
    #[default]
    Generic,
    /// Combo box (button + popup list)
    ComboBox,
}

/// Core widget trait.
///
/// # Lifecycle
///
/// 1. `layout`: receive the bounds of the widget's trigger area
/// 2. `event`: react to input, returning the messages it produced
pub trait Widget {
    /// Messages emitted by this widget.
    type Message;

    /// Get the type identifier for this widget type.
    fn type_id(&self) -> TypeId;

    /// Position the widget within allocated bounds.
    fn layout(&mut self, bounds: Rect) -> LayoutResult;

    /// Handle an input event. Messages are fire-and-forget.
    fn event(&mut self, event: &Event) -> Vec<Self::Message>;

    /// Check if this widget can receive keyboard focus.
    fn is_focusable(&self) -> bool {
        false
    }

    /// Get the accessible name for screen readers.
    fn accessible_name(&self) -> Option<&str> {
        None
    }

    /// Get the accessible role.
    fn accessible_role(&self) -> AccessibleRole {
        AccessibleRole::Generic
    }

    /// Get the test ID for this widget (if any).
    fn test_id(&self) -> Option<&str> {
        None
    }

    /// Get the current bounds of this widget.
    fn bounds(&self) -> Rect {
        Rect::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        bounds: Rect,
    }

    impl Widget for Echo {
        type Message = String;

        fn type_id(&self) -> TypeId {
            TypeId::of::<Self>()
        }

        fn layout(&mut self, bounds: Rect) -> LayoutResult {
            self.bounds = bounds;
            LayoutResult {
                size: bounds.size(),
            }
        }

        fn event(&mut self, event: &Event) -> Vec<String> {
            match event {
                Event::TextInput { text } => vec![text.clone()],
                _ => Vec::new(),
            }
        }

        fn bounds(&self) -> Rect {
            self.bounds
        }
    }

    #[test]
    fn test_widget_defaults() {
        let w = Echo {
            bounds: Rect::default(),
        };
        assert!(!w.is_focusable());
        assert_eq!(w.accessible_role(), AccessibleRole::Generic);
        assert!(w.accessible_name().is_none());
        assert!(w.test_id().is_none());
    }

    #[test]
    fn test_widget_layout_and_event() {
        let mut w = Echo {
            bounds: Rect::default(),
        };
        let r = w.layout(Rect::new(0.0, 0.0, 50.0, 20.0));
        assert_eq!(r.size, Size::new(50.0, 20.0));
        assert_eq!(w.bounds().width, 50.0);
        let out = w.event(&Event::TextInput {
            text: "a".to_string(),
        });
        assert_eq!(out, vec!["a".to_string()]);
        assert!(w.event(&Event::FocusIn).is_empty());
    }

    #[test]
    fn test_type_id_distinct() {
        assert_eq!(TypeId::of::<Echo>(), TypeId::of::<Echo>());
        assert_ne!(TypeId::of::<Echo>(), TypeId::of::<u8>());
    }
}
