//! Dropdown toggle collaborator.

use serde::{Deserialize, Serialize};

/// Lifecycle notifications reported back by the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropdownLifecycle {
    /// About to open
    Show,
    /// Open and visible
    Shown,
    /// About to close
    Hide,
    /// Closed
    Hidden,
}

/// Opens and closes the menu popup.
///
/// Implementations report progress through
/// `SelectPicker::on_dropdown`; the picker never assumes an open or close
/// completed synchronously when a toggle is installed.
pub trait DropdownToggle {
    fn open(&mut self);
    fn close(&mut self);
    fn is_open(&self) -> bool;

    fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flag(bool);

    impl DropdownToggle for Flag {
        fn open(&mut self) {
            self.0 = true;
        }
        fn close(&mut self) {
            self.0 = false;
        }
        fn is_open(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_default_toggle_flips() {
        let mut t = Flag::default();
        t.toggle();
        assert!(t.is_open());
        t.toggle();
        assert!(!t.is_open());
    }
}
