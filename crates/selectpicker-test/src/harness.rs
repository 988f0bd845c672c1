//! Event-level harness for a [`SelectPicker`].
//!
//! Input goes through [`Widget::event`] the way a host event loop would
//! deliver it; everything the picker emits is collected for assertions.

use std::collections::VecDeque;
use std::time::Duration;

use selectpicker_core::{Event, Key, MouseButton, Point, Rect, Widget};
use selectpicker_widgets::{PickerEvent, SelectPicker};

/// Where the picker button sits unless a test says otherwise.
pub const BUTTON: Rect = Rect::new(20.0, 20.0, 220.0, 38.0);

/// Test harness around one picker.
#[derive(Debug)]
pub struct PickerHarness {
    picker: SelectPicker,
    event_queue: VecDeque<Event>,
    emitted: Vec<PickerEvent>,
}

impl PickerHarness {
    /// Lay the picker out at [`BUTTON`] and take its construction events.
    pub fn new(mut picker: SelectPicker) -> Self {
        picker.layout(BUTTON);
        let emitted = picker.drain_events();
        Self {
            picker,
            event_queue: VecDeque::new(),
            emitted,
        }
    }

    pub fn picker(&self) -> &SelectPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut SelectPicker {
        &mut self.picker
    }

    // === Event Simulation ===

    /// Click the picker button.
    pub fn click_button(&mut self) -> &mut Self {
        self.mouse_down(BUTTON.center())
    }

    /// Click row `index` of the current sequence, scrolling it into view
    /// first if needed.
    pub fn click_row(&mut self, index: usize) -> &mut Self {
        let Some(row) = self.picker.rows().get(index) else {
            return self;
        };
        let (top, height) = (row.offset_px, row.height_px);
        let viewport = self.picker.viewport().viewport_height();
        let mut scroll = self.picker.viewport().scroll_top();
        if top < scroll || top + height > scroll + viewport {
            scroll = top;
            self.scroll_to(scroll);
        }
        let scroll = self.picker.viewport().scroll_top();
        let y = self.list_top() + top - scroll + height / 2.0;
        let x = self.picker.menu_rect().x + 10.0;
        self.mouse_down(Point::new(x, y))
    }

    /// Click outside both the button and the menu.
    pub fn click_outside(&mut self) -> &mut Self {
        self.mouse_down(Point::new(1200.0, 700.0))
    }

    /// Click the "select all" half of the actions box.
    pub fn click_select_all(&mut self) -> &mut Self {
        let point = self.actions_point(0.25);
        self.mouse_down(point)
    }

    /// Click the "deselect all" half of the actions box.
    pub fn click_deselect_all(&mut self) -> &mut Self {
        let point = self.actions_point(0.75);
        self.mouse_down(point)
    }

    /// Simulate a key press.
    pub fn press_key(&mut self, key: Key) -> &mut Self {
        self.event_queue.push_back(Event::KeyDown { key });
        self.process_events();
        self
    }

    /// Type `text` one character at a time.
    pub fn type_text(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            self.event_queue.push_back(Event::TextInput {
                text: c.to_string(),
            });
        }
        self.process_events();
        self
    }

    /// Scroll the menu to an absolute offset.
    pub fn scroll_to(&mut self, offset: f32) -> &mut Self {
        self.event_queue.push_back(Event::Scroll { offset });
        self.process_events();
        self
    }

    /// Resize the window.
    pub fn resize(&mut self, width: f32, height: f32) -> &mut Self {
        self.event_queue.push_back(Event::Resize { width, height });
        self.process_events();
        self
    }

    /// Advance simulated time.
    pub fn tick(&mut self, ms: u64) -> &mut Self {
        self.picker.advance(Duration::from_millis(ms));
        self.collect();
        self
    }

    // === Queries ===

    /// Everything emitted so far.
    pub fn events(&self) -> &[PickerEvent] {
        &self.emitted
    }

    /// Remove and return everything emitted so far.
    pub fn take_events(&mut self) -> Vec<PickerEvent> {
        self.collect();
        std::mem::take(&mut self.emitted)
    }

    /// Number of emitted events matching `pred`.
    pub fn count(&self, pred: impl Fn(&PickerEvent) -> bool) -> usize {
        self.emitted.iter().filter(|e| pred(e)).count()
    }

    /// Number of change notifications emitted so far.
    pub fn changes(&self) -> usize {
        self.count(PickerEvent::is_change)
    }

    /// Display texts of the current sequence's option rows.
    pub fn option_texts(&self) -> Vec<String> {
        self.picker
            .rows()
            .iter()
            .filter(|r| r.is_option())
            .map(|r| r.display_text.clone())
            .collect()
    }

    // === Assertions ===

    /// Assert the selected values.
    ///
    /// # Panics
    ///
    /// Panics if the selection differs.
    pub fn assert_values(&self, expected: &[&str]) -> &Self {
        let actual = self.picker.values();
        assert_eq!(actual, expected, "selected values differ");
        self
    }

    /// Assert the button text.
    ///
    /// # Panics
    ///
    /// Panics if the text differs.
    pub fn assert_button_text(&self, expected: &str) -> &Self {
        let actual = &self.picker.button().text;
        assert_eq!(
            actual, expected,
            "Expected button text '{expected}' but got '{actual}'"
        );
        self
    }

    /// Assert whether the menu is open.
    ///
    /// # Panics
    ///
    /// Panics if the open state differs.
    pub fn assert_open(&self, expected: bool) -> &Self {
        assert_eq!(self.picker.is_open(), expected, "menu open state differs");
        self
    }

    /// Assert the descriptor, rendered element and native option of every
    /// main row agree on selected state.
    ///
    /// # Panics
    ///
    /// Panics on the first disagreement.
    pub fn assert_mirrors_consistent(&self) -> &Self {
        let native = self.picker.native();
        for row in self.picker.main_rows().iter().filter(|r| r.is_option()) {
            let option = native.find(&row.value);
            assert_eq!(
                option.map(|o| o.selected),
                Some(row.selected),
                "native option '{}' disagrees with its row",
                row.value
            );
            if let Some(el) = &row.element {
                assert_eq!(
                    el.selected, row.selected,
                    "element of '{}' disagrees with its row",
                    row.value
                );
            }
        }
        self
    }

    // === Internal ===

    fn mouse_down(&mut self, position: Point) -> &mut Self {
        self.event_queue.push_back(Event::MouseMove { position });
        self.event_queue.push_back(Event::MouseDown {
            position,
            button: MouseButton::Left,
        });
        self.process_events();
        self
    }

    fn list_top(&self) -> f32 {
        let menu = self.picker.menu_rect();
        let info = self.picker.size_info();
        menu.y
            + info.menu_padding_vertical / 2.0
            + info.header_height
            + info.search_height
            + info.actions_height
    }

    fn actions_point(&self, fraction: f32) -> Point {
        let menu = self.picker.menu_rect();
        let info = self.picker.size_info();
        let y = self.list_top() - info.actions_height / 2.0;
        Point::new(menu.x + menu.width * fraction, y)
    }

    fn process_events(&mut self) {
        while let Some(event) = self.event_queue.pop_front() {
            let out = self.picker.event(&event);
            self.emitted.extend(out);
        }
    }

    fn collect(&mut self) {
        let out = self.picker.drain_events();
        self.emitted.extend(out);
    }
}
