//! Layout/sizing oracle and menu placement.
//!
//! Row heights and menu chrome are measured once through a [`LayoutProbe`]
//! and cached until [`SizingOracle::invalidate`]. A probe that reports zero
//! dimensions means the widget is detached; the oracle then keeps serving
//! the previous measurement instead of collapsing every row to zero height.

use selectpicker_core::{Rect, Size};

use crate::config::SizeMode;
use crate::row::RowKind;

/// Which pieces of menu chrome are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeConfig {
    pub header: bool,
    pub search: bool,
    pub actions: bool,
    pub done_button: bool,
}

/// Raw pixel measurements reported by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProbeReport {
    pub option_height: f32,
    pub divider_height: f32,
    pub group_label_height: f32,
    pub header_height: f32,
    pub search_height: f32,
    pub actions_height: f32,
    pub done_button_height: f32,
    /// Menu padding plus border, vertical
    pub menu_padding_vertical: f32,
    /// Menu padding plus border, horizontal
    pub menu_padding_horizontal: f32,
    pub menu_width: f32,
    /// Menu width with a forced scrollbar
    pub menu_width_with_scrollbar: f32,
    pub button_width: f32,
}

impl ProbeReport {
    /// A report from a detached widget has no height for an option row.
    pub fn is_detached(&self) -> bool {
        self.option_height <= 0.0
    }
}

/// Off-screen measurement of rows and chrome.
///
/// Implementations render one throwaway instance of each row kind plus the
/// enabled chrome, measure it, and discard it.
pub trait LayoutProbe {
    fn probe(&mut self, chrome: &ChromeConfig) -> ProbeReport;

    /// Width of the rendered text of one option, used to track the widest row.
    fn option_width(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }
}

/// A probe that reports fixed Bootstrap-like dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProbe;

impl LayoutProbe for DefaultProbe {
    fn probe(&mut self, chrome: &ChromeConfig) -> ProbeReport {
        let defaults = SizeInfo::default();
        ProbeReport {
            option_height: defaults.option_height,
            divider_height: defaults.divider_height,
            group_label_height: defaults.group_label_height,
            header_height: if chrome.header { 38.0 } else { 0.0 },
            search_height: if chrome.search { 46.0 } else { 0.0 },
            actions_height: if chrome.actions { 44.0 } else { 0.0 },
            done_button_height: if chrome.done_button { 44.0 } else { 0.0 },
            menu_padding_vertical: defaults.menu_padding_vertical,
            menu_padding_horizontal: defaults.menu_padding_horizontal,
            menu_width: 220.0,
            menu_width_with_scrollbar: 220.0 + defaults.scrollbar_width,
            button_width: 220.0,
        }
    }
}

/// Cached sizing used by the position index and the placement math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeInfo {
    pub option_height: f32,
    pub divider_height: f32,
    pub group_label_height: f32,
    pub header_height: f32,
    pub search_height: f32,
    pub actions_height: f32,
    pub done_button_height: f32,
    pub menu_padding_vertical: f32,
    pub menu_padding_horizontal: f32,
    pub scrollbar_width: f32,
    pub button_width: f32,
    /// Widest option text seen so far
    pub widest_option: f32,
}

impl Default for SizeInfo {
    fn default() -> Self {
        Self {
            option_height: 32.0,
            divider_height: 9.0,
            group_label_height: 32.0,
            header_height: 0.0,
            search_height: 0.0,
            actions_height: 0.0,
            done_button_height: 0.0,
            menu_padding_vertical: 10.0,
            menu_padding_horizontal: 2.0,
            scrollbar_width: 17.0,
            button_width: 220.0,
            widest_option: 0.0,
        }
    }
}

impl SizeInfo {
    /// Height of a row of `kind`.
    pub const fn row_height(&self, kind: RowKind) -> f32 {
        match kind {
            RowKind::Option => self.option_height,
            RowKind::Divider => self.divider_height,
            RowKind::GroupLabel => self.group_label_height,
        }
    }

    /// Height of the enabled chrome around the scrollable list.
    pub fn chrome_height(&self) -> f32 {
        self.header_height
            + self.search_height
            + self.actions_height
            + self.done_button_height
            + self.menu_padding_vertical
    }

    fn apply(&mut self, report: &ProbeReport) {
        self.option_height = report.option_height;
        self.divider_height = report.divider_height;
        self.group_label_height = report.group_label_height;
        self.header_height = report.header_height;
        self.search_height = report.search_height;
        self.actions_height = report.actions_height;
        self.done_button_height = report.done_button_height;
        self.menu_padding_vertical = report.menu_padding_vertical;
        self.menu_padding_horizontal = report.menu_padding_horizontal;
        self.apply_widths(report);
    }

    fn apply_widths(&mut self, report: &ProbeReport) {
        if report.menu_width_with_scrollbar > 0.0 {
            self.scrollbar_width = (report.menu_width_with_scrollbar - report.menu_width).max(0.0);
        }
        if report.button_width > 0.0 {
            self.button_width = report.button_width;
        }
    }
}

/// Measures once, then serves the cached [`SizeInfo`] until invalidated.
#[derive(Debug, Clone, Default)]
pub struct SizingOracle {
    cached: SizeInfo,
    valid: bool,
    measurements: u32,
}

impl SizingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sizing, measured or not.
    pub const fn size_info(&self) -> &SizeInfo {
        &self.cached
    }

    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of probe passes that produced a measurement.
    pub const fn measurements(&self) -> u32 {
        self.measurements
    }

    /// Drop the cached measurement; the next [`Self::measure`] probes again.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Measure through `probe` unless a valid measurement is cached.
    pub fn measure(&mut self, probe: &mut dyn LayoutProbe, chrome: &ChromeConfig) -> SizeInfo {
        if self.valid {
            return self.cached;
        }
        let report = probe.probe(chrome);
        if report.is_detached() {
            tracing::warn!(
                message = "layout probe reported zero size; keeping cached sizing",
                option_height = self.cached.option_height,
            );
            return self.cached;
        }
        self.cached.apply(&report);
        self.valid = true;
        self.measurements += 1;
        tracing::debug!(message = "measured menu sizing", size_info = ?self.cached);
        self.cached
    }

    /// Refresh the width-dependent fields after a window resize.
    pub fn on_resize(&mut self, probe: &mut dyn LayoutProbe, chrome: &ChromeConfig) {
        let report = probe.probe(chrome);
        if report.is_detached() {
            return;
        }
        self.cached.apply_widths(&report);
    }

    /// Record option texts; returns `true` when the widest option grew.
    pub fn observe_options<'a>(
        &mut self,
        probe: &mut dyn LayoutProbe,
        texts: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        let before = self.cached.widest_option;
        for text in texts {
            let w = probe.option_width(text);
            if w > self.cached.widest_option {
                self.cached.widest_option = w;
            }
        }
        self.cached.widest_option > before
    }
}

/// Inputs to [`MenuPlacement::compute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub size: SizeMode,
    pub button: Rect,
    pub window: Size,
    pub window_padding: f32,
    /// Total height of the current row sequence
    pub content_height: f32,
    pub dropup_auto: bool,
}

/// Computed geometry of the open menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPlacement {
    /// Outer height including chrome
    pub max_height: f32,
    /// Height of the scrollable list area
    pub inner_height: f32,
    pub min_height: f32,
    pub min_width: f32,
    /// Open above the button
    pub dropup: bool,
}

impl MenuPlacement {
    /// Place the menu.
    ///
    /// `nth_option_bottom(n)` gives the bottom edge of the `n`-th option row
    /// of the sequence, used when `size` is a row count.
    pub fn compute(
        req: &PlacementRequest,
        info: &SizeInfo,
        nth_option_bottom: impl Fn(usize) -> Option<f32>,
    ) -> Self {
        let chrome = info.chrome_height();
        let space_below = (req.window.height - req.button.bottom() - req.window_padding).max(0.0);
        let space_above = (req.button.y - req.window_padding).max(0.0);
        let min_height = info.option_height * 3.0 + chrome;

        let (max_height, dropup) = match req.size {
            SizeMode::Auto => {
                let dropup = req.dropup_auto
                    && space_above > space_below
                    && space_below - chrome < min_height;
                let space = if dropup { space_above } else { space_below };
                (space.max(min_height), dropup)
            }
            SizeMode::Rows(n) => {
                let needed = nth_option_bottom(n).unwrap_or(req.content_height) + chrome;
                let dropup = req.dropup_auto && space_above > space_below && space_below < needed;
                (needed, dropup)
            }
            SizeMode::Unbounded => (req.content_height + chrome, false),
        };

        Self {
            max_height,
            inner_height: (max_height - chrome).max(0.0).min(req.content_height),
            min_height,
            min_width: req.button.width,
            dropup,
        }
    }
}
