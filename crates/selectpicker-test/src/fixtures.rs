//! Recording collaborators and sample selects.
//!
//! Each recorder hands out a cloneable log handle before it is moved into
//! the picker, so a test can inspect what the picker asked for.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use selectpicker_widgets::{
    AllowList, ChromeConfig, DataSource, DropdownToggle, FetchRequest, FetchResponse, LayoutProbe,
    NativeGroup, NativeOption, NativeSelect, ProbeReport, Sanitizer, SizeInfo, SourceItem,
};

// === Native selects ===

/// `n` options valued `v0..` with texts `Item 0..`.
pub fn numbered_select(n: usize, multiple: bool) -> NativeSelect {
    let base = if multiple {
        NativeSelect::multiple()
    } else {
        NativeSelect::single()
    };
    base.options((0..n).map(|i| NativeOption::new(format!("v{i}"), format!("Item {i}"))))
}

/// One ungrouped option followed by two groups:
///
/// ```text
/// Solo
/// [Fruit] Apple, Banana, Cherry   (group limit 2)
/// [Veg]   Carrot, Daikon
/// ```
pub fn grouped_select(multiple: bool) -> NativeSelect {
    let base = if multiple {
        NativeSelect::multiple()
    } else {
        NativeSelect::single()
    };
    base.option(NativeOption::new("solo", "Solo"))
        .group(
            NativeGroup::new("Fruit")
                .max_options(2)
                .option(NativeOption::new("apple", "Apple"))
                .option(NativeOption::new("banana", "Banana"))
                .option(NativeOption::new("cherry", "Cherry")),
        )
        .group(
            NativeGroup::new("Veg")
                .option(NativeOption::new("carrot", "Carrot"))
                .option(NativeOption::new("daikon", "Daikon")),
        )
}

// === Layout probe ===

/// A probe reporting fixed sizes and counting how often it was asked.
#[derive(Debug, Clone)]
pub struct FixedProbe {
    report: ProbeReport,
    detached: Rc<Cell<bool>>,
    calls: Rc<Cell<u32>>,
}

impl FixedProbe {
    /// Options `option_height` tall; other sizes follow the defaults.
    pub fn new(option_height: f32) -> Self {
        let d = SizeInfo::default();
        Self {
            report: ProbeReport {
                option_height,
                divider_height: d.divider_height,
                group_label_height: d.group_label_height,
                header_height: 0.0,
                search_height: 0.0,
                actions_height: 0.0,
                done_button_height: 0.0,
                menu_padding_vertical: d.menu_padding_vertical,
                menu_padding_horizontal: d.menu_padding_horizontal,
                menu_width: 220.0,
                menu_width_with_scrollbar: 220.0 + d.scrollbar_width,
                button_width: 220.0,
            },
            detached: Rc::new(Cell::new(false)),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Report these chrome heights whenever the chrome piece is enabled.
    #[must_use]
    pub fn with_chrome(mut self, header: f32, search: f32, actions: f32, done: f32) -> Self {
        self.report.header_height = header;
        self.report.search_height = search;
        self.report.actions_height = actions;
        self.report.done_button_height = done;
        self
    }

    /// Handle to the probe call counter.
    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }

    /// Handle that makes the probe report a detached (zero-size) widget.
    pub fn detached(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.detached)
    }
}

impl LayoutProbe for FixedProbe {
    fn probe(&mut self, chrome: &ChromeConfig) -> ProbeReport {
        self.calls.set(self.calls.get() + 1);
        if self.detached.get() {
            return ProbeReport {
                option_height: 0.0,
                divider_height: 0.0,
                group_label_height: 0.0,
                header_height: 0.0,
                search_height: 0.0,
                actions_height: 0.0,
                done_button_height: 0.0,
                menu_padding_vertical: 0.0,
                menu_padding_horizontal: 0.0,
                menu_width: 0.0,
                menu_width_with_scrollbar: 0.0,
                button_width: 0.0,
            };
        }
        let pick = |on: bool, h: f32| if on { h } else { 0.0 };
        ProbeReport {
            header_height: pick(chrome.header, self.report.header_height),
            search_height: pick(chrome.search, self.report.search_height),
            actions_height: pick(chrome.actions, self.report.actions_height),
            done_button_height: pick(chrome.done_button, self.report.done_button_height),
            ..self.report
        }
    }
}

// === Data source ===

/// Requests seen by a [`RecordingSource`].
#[derive(Debug, Clone, Default)]
pub struct SourceLog(Rc<RefCell<Vec<FetchRequest>>>);

impl SourceLog {
    /// Every request so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The newest request.
    pub fn last(&self) -> Option<FetchRequest> {
        self.0.borrow().last().cloned()
    }

    /// Remove and return every request so far.
    pub fn take(&self) -> Vec<FetchRequest> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// A data source that only records requests; the test answers them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSource {
    log: SourceLog,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> SourceLog {
        self.log.clone()
    }
}

impl DataSource for RecordingSource {
    fn fetch(&mut self, request: &FetchRequest) {
        self.log.0.borrow_mut().push(request.clone());
    }
}

/// A server-side item list that answers page requests.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<SourceItem>,
}

impl Catalog {
    pub fn new(items: Vec<SourceItem>) -> Self {
        Self { items }
    }

    /// `n` items valued `r0..` with texts `Remote 0..`.
    pub fn numbered(n: usize) -> Self {
        Self::new(
            (0..n)
                .map(|i| SourceItem::new(format!("r{i}"), format!("Remote {i}")))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The page `request` asks for, filtered by its search term
    /// (case-insensitive substring of the text).
    pub fn respond(&self, request: &FetchRequest) -> FetchResponse {
        let matching: Vec<&SourceItem> = match &request.search_term {
            Some(term) => {
                let term = term.to_lowercase();
                self.items
                    .iter()
                    .filter(|i| i.text.to_lowercase().contains(&term))
                    .collect()
            }
            None => self.items.iter().collect(),
        };
        let start = (request.page * request.page_size).min(matching.len());
        let end = (start + request.page_size).min(matching.len());
        FetchResponse {
            request: request.clone(),
            items: matching[start..end].iter().map(|&i| i.clone()).collect(),
            has_more: end < matching.len(),
            total: Some(matching.len()),
        }
    }
}

// === Sanitizer ===

/// Strips `<script>` elements and counts invocations.
#[derive(Debug, Clone, Default)]
pub struct RecordingSanitizer {
    calls: Rc<Cell<u32>>,
}

impl RecordingSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }
}

impl Sanitizer for RecordingSanitizer {
    fn sanitize(&mut self, fragment: &str, _allow_list: &AllowList) -> String {
        self.calls.set(self.calls.get() + 1);
        let mut out = fragment.to_string();
        while let Some(start) = out.find("<script") {
            let end = out[start..]
                .find("</script>")
                .map_or(out.len(), |e| start + e + "</script>".len());
            out.replace_range(start..end, "");
        }
        out
    }
}

// === Dropdown toggle ===

/// Open and close calls seen by a [`RecordingToggle`].
#[derive(Debug, Clone, Default)]
pub struct ToggleLog {
    open: Rc<Cell<bool>>,
    opens: Rc<Cell<u32>>,
    closes: Rc<Cell<u32>>,
}

impl ToggleLog {
    pub fn opens(&self) -> u32 {
        self.opens.get()
    }

    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

/// A toggle that records requests and leaves lifecycle reporting to the test.
#[derive(Debug, Clone, Default)]
pub struct RecordingToggle {
    log: ToggleLog,
}

impl RecordingToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ToggleLog {
        self.log.clone()
    }
}

impl DropdownToggle for RecordingToggle {
    fn open(&mut self) {
        self.log.opens.set(self.log.opens.get() + 1);
        self.log.open.set(true);
    }

    fn close(&mut self) {
        self.log.closes.set(self.log.closes.get() + 1);
        self.log.open.set(false);
    }

    fn is_open(&self) -> bool {
        self.log.open.get()
    }
}
