//! The select picker widget.
//!
//! `SelectPicker` owns the native select mirror, the main row sequence, an
//! optional search sequence, and the collaborators that measure, render,
//! fetch and toggle. All mutation happens synchronously inside one call;
//! notifications queue up and are drained by the host.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use selectpicker_core::{
    scroll_target, AccessibleRole, Event, Key, LayoutResult, MouseButton, Point, Rect, ScrollAlign,
    Size, TypeId, VisibleSlice, Widget,
};

use crate::config::{PickerConfig, SelectedTextFormat};
use crate::dropdown::{DropdownLifecycle, DropdownToggle};
use crate::layout::{
    ChromeConfig, DefaultProbe, LayoutProbe, MenuPlacement, PlacementRequest, SizeInfo,
    SizingOracle,
};
use crate::messages::{ButtonText, ChangeDetail, LimitNotice, PickerEvent};
use crate::model::OptionModelBuilder;
use crate::native::{NativeGroup, NativeNode, NativeOption, NativeSelect};
use crate::position::{Direction, PositionIndex};
use crate::render::{
    BootstrapTemplates, EscapeSanitizer, PickerView, RowRenderer, Sanitizer, TemplateProvider,
};
use crate::row::RowDescriptor;
use crate::search::{filter_with, normalize, SearchQuery};
use crate::selection::{Activation, Limit, Selection};
use crate::source::{DataSource, FetchResponse, PagingState, SourceItem};
use crate::timers::{Deferred, TimerQueue, NOTICE_DURATION, REVERT_DELAY, TYPE_AHEAD_RESET};
use crate::viewport::{MountedRun, ViewportController};

const DEFAULT_WINDOW: Size = Size::new(1280.0, 720.0);

/// The active search: its term and the filtered sequence.
#[derive(Debug, Clone)]
struct SearchState {
    term: String,
    query: SearchQuery,
    /// Values the data source returned for this term
    fetched: HashSet<String>,
    rows: Vec<RowDescriptor>,
    index: PositionIndex,
}

impl SearchState {
    /// Re-derive the search rows from `main`.
    ///
    /// With `carry_over`, rows that survive keep their rendered state. Only
    /// valid when `main` changed by appending: a rebuilt `main` reuses data
    /// indices for other options.
    fn refilter(&mut self, main: &[RowDescriptor], sizes: &SizeInfo, carry_over: bool) {
        let previous = std::mem::take(&mut self.rows);
        let mut rows =
            filter_with(main, |r| self.query.matches(r) || self.fetched.contains(&r.value));
        if carry_over {
            let mut previous: HashMap<String, RowDescriptor> = previous
                .into_iter()
                .filter(RowDescriptor::is_option)
                .map(|r| (r.value.clone(), r))
                .collect();
            for row in rows.iter_mut().filter(|r| r.is_option()) {
                let Some(prev) = previous.remove(&row.value) else {
                    continue;
                };
                if prev.data_index == row.data_index {
                    row.element = prev.element;
                    row.content = prev.content;
                    row.sanitized = prev.sanitized;
                }
            }
        }
        self.index = PositionIndex::reindex(&mut rows, sizes);
        self.rows = rows;
    }
}

/// Builder for [`SelectPicker`].
pub struct PickerBuilder {
    native: NativeSelect,
    config: PickerConfig,
    probe: Box<dyn LayoutProbe>,
    templates: Box<dyn TemplateProvider>,
    sanitizer: Box<dyn Sanitizer>,
    source: Option<Box<dyn DataSource>>,
    toggle: Option<Box<dyn DropdownToggle>>,
    test_id: Option<String>,
    accessible_name: Option<String>,
}

impl PickerBuilder {
    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: PickerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the layout probe.
    #[must_use]
    pub fn probe(mut self, probe: impl LayoutProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Set the row templates.
    #[must_use]
    pub fn templates(mut self, templates: impl TemplateProvider + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    /// Set the content sanitizer.
    #[must_use]
    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// Back the picker with a paged data source.
    #[must_use]
    pub fn source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Delegate opening and closing to a dropdown toggle.
    #[must_use]
    pub fn toggle(mut self, toggle: impl DropdownToggle + 'static) -> Self {
        self.toggle = Some(Box::new(toggle));
        self
    }

    /// Set test ID.
    #[must_use]
    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Set accessible name.
    #[must_use]
    pub fn accessible_name(mut self, name: impl Into<String>) -> Self {
        self.accessible_name = Some(name.into());
        self
    }

    /// Build the picker: mirror the native selection, measure, index, lay
    /// out the first window, and request the first page if backed by a
    /// source.
    pub fn build(self) -> SelectPicker {
        let mut native = self.native;
        if !native.multiple && self.config.title.is_some() {
            native.insert_placeholder();
        }
        let forced = self.source.is_some();
        let renderer = RowRenderer::new(
            self.templates,
            self.sanitizer,
            self.config.sanitize,
            self.config.white_list.clone(),
        );
        let viewport =
            ViewportController::new(self.config.chunk_size, self.config.virtual_scroll, forced);

        let mut picker = SelectPicker {
            config: self.config,
            native,
            main: Vec::new(),
            main_index: PositionIndex::default(),
            search: None,
            oracle: SizingOracle::new(),
            probe: self.probe,
            renderer,
            viewport,
            source: self.source,
            main_paging: PagingState::default(),
            search_paging: PagingState::default(),
            term_only: HashSet::new(),
            toggle: self.toggle,
            timers: TimerQueue::new(),
            events: Vec::new(),
            active: None,
            open: false,
            bounds: Rect::new(0.0, 0.0, 0.0, 0.0),
            window: DEFAULT_WINDOW,
            placement: MenuPlacement {
                max_height: 0.0,
                inner_height: 0.0,
                min_height: 0.0,
                min_width: 0.0,
                dropup: false,
            },
            notice: None,
            search_input: String::new(),
            type_buffer: String::new(),
            button: ButtonText::default(),
            test_id: self.test_id,
            accessible_name: self.accessible_name,
        };
        picker.rebuild();
        picker.events.push(PickerEvent::Initialized);
        picker.render();
        picker
    }
}

/// A select picker bound to one native select.
pub struct SelectPicker {
    config: PickerConfig,
    native: NativeSelect,
    main: Vec<RowDescriptor>,
    main_index: PositionIndex,
    search: Option<SearchState>,
    oracle: SizingOracle,
    probe: Box<dyn LayoutProbe>,
    renderer: RowRenderer,
    viewport: ViewportController,
    source: Option<Box<dyn DataSource>>,
    main_paging: PagingState,
    search_paging: PagingState,
    /// Values only a search-term page brought in
    term_only: HashSet<String>,
    toggle: Option<Box<dyn DropdownToggle>>,
    timers: TimerQueue,
    events: Vec<PickerEvent>,
    /// Index into the current sequence of the keyboard-focused row
    active: Option<usize>,
    open: bool,
    bounds: Rect,
    window: Size,
    placement: MenuPlacement,
    notice: Option<LimitNotice>,
    search_input: String,
    type_buffer: String,
    button: ButtonText,
    test_id: Option<String>,
    accessible_name: Option<String>,
}

impl std::fmt::Debug for SelectPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectPicker")
            .field("multiple", &self.native.multiple)
            .field("rows", &self.main.len())
            .field("searching", &self.search.as_ref().map(|s| &s.term))
            .field("active", &self.active)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl SelectPicker {
    /// Start building a picker over `native`.
    pub fn builder(native: NativeSelect) -> PickerBuilder {
        PickerBuilder {
            native,
            config: PickerConfig::default(),
            probe: Box::new(DefaultProbe),
            templates: Box::new(BootstrapTemplates),
            sanitizer: Box::new(EscapeSanitizer),
            source: None,
            toggle: None,
            test_id: None,
            accessible_name: None,
        }
    }

    /// A picker with default collaborators.
    pub fn new(native: NativeSelect, config: PickerConfig) -> Self {
        Self::builder(native).config(config).build()
    }

    // === Accessors ===

    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub const fn native(&self) -> &NativeSelect {
        &self.native
    }

    /// Mutable access to the native select. Call
    /// [`Self::on_external_mutation`] afterwards.
    pub fn native_mut(&mut self) -> &mut NativeSelect {
        &mut self.native
    }

    pub const fn is_multiple(&self) -> bool {
        self.native.multiple
    }

    /// The current sequence: search results while searching, else main.
    pub fn rows(&self) -> &[RowDescriptor] {
        self.search.as_ref().map_or(&self.main, |s| &s.rows)
    }

    /// The unfiltered sequence.
    pub fn main_rows(&self) -> &[RowDescriptor] {
        &self.main
    }

    fn current_index(&self) -> &PositionIndex {
        self.search.as_ref().map_or(&self.main_index, |s| &s.index)
    }

    fn rows_mut(&mut self) -> &mut Vec<RowDescriptor> {
        match &mut self.search {
            Some(s) => &mut s.rows,
            None => &mut self.main,
        }
    }

    pub const fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.term.as_str())
    }

    /// Text to show when the search matched nothing.
    pub fn no_results(&self) -> Option<String> {
        let search = self.search.as_ref()?;
        if search.rows.iter().any(RowDescriptor::is_option) {
            return None;
        }
        Some(self.config.no_results_text(&search.term))
    }

    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn placement(&self) -> &MenuPlacement {
        &self.placement
    }

    pub const fn size_info(&self) -> &SizeInfo {
        self.oracle.size_info()
    }

    pub const fn oracle(&self) -> &SizingOracle {
        &self.oracle
    }

    pub const fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub const fn mounted(&self) -> &MountedRun {
        self.viewport.mounted()
    }

    pub const fn slice(&self) -> &VisibleSlice {
        self.viewport.slice()
    }

    /// Whether the current sequence is windowed.
    pub fn is_virtual(&self) -> bool {
        self.viewport.is_virtual(self.rows().len())
    }

    pub const fn notice(&self) -> Option<&LimitNotice> {
        self.notice.as_ref()
    }

    pub const fn button(&self) -> &ButtonText {
        &self.button
    }

    /// Paging state of the current sequence.
    pub const fn paging(&self) -> &PagingState {
        if self.search.is_some() {
            &self.search_paging
        } else {
            &self.main_paging
        }
    }

    /// Take the queued notifications.
    pub fn drain_events(&mut self) -> Vec<PickerEvent> {
        std::mem::take(&mut self.events)
    }

    fn view(&self) -> PickerView {
        PickerView {
            multiple: self.native.multiple,
            show_subtext: self.config.show_subtext,
            show_icon: self.config.show_icon,
            show_content: self.config.show_content,
            show_tick: self.config.show_tick,
            icon_base: self.config.icon_base.clone(),
            tick_icon: self.config.tick_icon.clone(),
            search_term: self.search.as_ref().map(|s| s.term.clone()),
        }
    }

    fn chrome(&self) -> ChromeConfig {
        let multiple = self.native.multiple;
        ChromeConfig {
            header: self.config.header.is_some(),
            search: self.config.live_search,
            actions: self.config.actions_box && multiple,
            done_button: self.config.done_button && multiple,
        }
    }

    fn selection(&mut self) -> Selection<'_> {
        Selection {
            main: &mut self.main,
            search: self.search.as_mut().map(|s| s.rows.as_mut_slice()),
            native: &mut self.native,
        }
    }

    // === Model lifecycle ===

    /// Rebuild the main sequence from the native select.
    fn rebuild(&mut self) {
        self.release_mounted();
        let builder = OptionModelBuilder::new(self.native.multiple, self.config.hide_disabled);
        self.main = builder.build(&self.native);
        self.sync_single_native();
        self.measure();
        self.main_index = PositionIndex::reindex(&mut self.main, self.oracle.size_info());
        if let Some(search) = &mut self.search {
            search.refilter(&self.main, self.oracle.size_info(), false);
        }
        self.active = None;
        self.viewport.reset();
        self.relayout();
    }

    /// In single-select mode the native select follows the one selected row.
    fn sync_single_native(&mut self) {
        if self.native.multiple {
            return;
        }
        let selected = self.main.iter().find(|r| r.is_option() && r.selected);
        if let Some(value) = selected.map(|r| r.value.clone()) {
            self.native.set_selected(&value, true);
        }
    }

    fn measure(&mut self) {
        let chrome = self.chrome();
        self.oracle.observe_options(
            self.probe.as_mut(),
            self.main
                .iter()
                .filter(|r| r.is_option())
                .map(|r| r.display_text.as_str()),
        );
        self.oracle.measure(self.probe.as_mut(), &chrome);
    }

    /// Re-measure if the cached sizing is stale, reindexing both sequences.
    fn remeasure_if_invalid(&mut self) {
        if self.oracle.is_valid() {
            return;
        }
        self.measure();
        self.main_index = PositionIndex::reindex(&mut self.main, self.oracle.size_info());
        if let Some(search) = &mut self.search {
            search.index = PositionIndex::reindex(&mut search.rows, self.oracle.size_info());
        }
        self.viewport.reset();
    }

    fn release_mounted(&mut self) {
        let range = self.viewport.mounted().range.clone();
        let rows = self.rows_mut();
        for row in rows.iter_mut().take(range.end).skip(range.start) {
            RowRenderer::release(row);
        }
    }

    /// Re-read the configuration and rebuild rows and measurements.
    pub fn refresh(&mut self) {
        self.oracle.invalidate();
        self.renderer
            .configure(self.config.sanitize, self.config.white_list.clone());
        self.viewport.configure(
            self.config.chunk_size,
            self.config.virtual_scroll,
            self.source.is_some(),
        );
        self.main_paging.restart();
        if !self.native.multiple && self.config.title.is_some() {
            self.native.insert_placeholder();
        }
        self.rebuild();
        self.render();
        tracing::debug!(message = "picker refreshed", rows = self.main.len());
        self.events.push(PickerEvent::Refreshed);
    }

    /// Replace the configuration and refresh.
    pub fn set_config(&mut self, config: PickerConfig) {
        self.config = config;
        self.refresh();
    }

    /// Resynchronize after the host changed the native select directly. The
    /// native select wins every disagreement.
    pub fn on_external_mutation(&mut self) {
        tracing::debug!(message = "native select mutated externally; resyncing");
        self.rebuild();
        self.render();
        self.events.push(PickerEvent::Refreshed);
    }

    // === Layout and windowing ===

    fn relayout(&mut self) {
        let top = self.viewport.scroll_top();
        self.relayout_at(top);
    }

    fn relayout_at(&mut self, scroll_top: f32) {
        let req = PlacementRequest {
            size: self.config.size,
            button: self.bounds,
            window: self.window,
            window_padding: self.config.window_padding,
            content_height: self.current_index().total_height(),
            dropup_auto: self.config.dropup_auto,
        };
        let rows = self.rows();
        let placement =
            MenuPlacement::compute(&req, self.oracle.size_info(), |n| nth_option_bottom(rows, n));
        self.placement = placement;
        self.viewport.set_viewport_height(placement.inner_height);
        self.update_window(scroll_top);
    }

    fn update_window(&mut self, scroll_top: f32) {
        let view = self.view();
        let (rows, index) = match &mut self.search {
            Some(s) => (&mut s.rows, &s.index),
            None => (&mut self.main, &self.main_index),
        };
        let max_top = (index.total_height() - self.viewport.viewport_height()).max(0.0);
        self.viewport.on_scroll(
            rows,
            index.bottoms(),
            scroll_top.min(max_top),
            &mut self.renderer,
            &view,
            self.active,
        );
        self.maybe_fetch();
    }

    /// The menu's scroll container moved to `scroll_top`.
    pub fn on_scroll(&mut self, scroll_top: f32) {
        self.update_window(scroll_top);
    }

    /// The window was resized.
    pub fn on_resize(&mut self, window: Size) {
        self.window = window;
        let chrome = self.chrome();
        self.oracle.on_resize(self.probe.as_mut(), &chrome);
        self.relayout();
    }

    /// Screen rectangle of the open menu.
    pub fn menu_rect(&self) -> Rect {
        let info = self.oracle.size_info();
        let height = self.placement.inner_height + info.chrome_height();
        let width = self
            .placement
            .min_width
            .max(info.widest_option + info.menu_padding_horizontal);
        let y = if self.placement.dropup {
            self.bounds.y - height
        } else {
            self.bounds.bottom()
        };
        Rect::new(self.bounds.x, y, width, height)
    }

    // === Paging ===

    fn maybe_fetch(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let len = self.search.as_ref().map_or(self.main.len(), |s| s.rows.len());
        let paging = if self.search.is_some() {
            &mut self.search_paging
        } else {
            &mut self.main_paging
        };
        if !self.viewport.wants_more(len, paging.has_more()) {
            return;
        }
        if let Some(request) = paging.next_request(self.config.source.page_size) {
            tracing::debug!(
                message = "fetching page",
                page = request.page,
                term = ?request.search_term,
                generation = request.generation,
            );
            source.fetch(&request);
        }
    }

    /// Deliver the answer to an earlier [`DataSource::fetch`]. Stale answers
    /// are dropped.
    pub fn on_fetch_complete(&mut self, response: FetchResponse) {
        let term = response.request.search_term.clone();
        let paging = if term.is_some() {
            &mut self.search_paging
        } else {
            &mut self.main_paging
        };
        if !paging.complete(&response) {
            return;
        }

        let previous_value = self.values();
        for item in &response.items {
            if term.is_none() {
                self.term_only.remove(&item.value);
            } else if !self.native.contains(&item.value) {
                self.term_only.insert(item.value.clone());
            }
        }

        self.release_mounted();
        let builder = OptionModelBuilder::new(self.native.multiple, self.config.hide_disabled);
        let added = builder.append_page(&mut self.main, &response.items);
        for item in &response.items {
            append_native(&mut self.native, item);
        }
        self.sync_single_native();
        self.oracle.observe_options(
            self.probe.as_mut(),
            response.items.iter().map(|i| i.text.as_str()),
        );
        self.main_index = PositionIndex::reindex(&mut self.main, self.oracle.size_info());
        if let Some(search) = &mut self.search {
            if term.as_deref() == Some(search.term.as_str()) {
                search
                    .fetched
                    .extend(response.items.iter().map(|i| i.value.clone()));
            }
            search.refilter(&self.main, self.oracle.size_info(), true);
        }
        self.viewport.reset();
        self.events.push(PickerEvent::Loaded {
            page: response.request.page,
            items: added,
            has_more: response.has_more,
            total: response.total,
        });
        self.relayout();

        // preselected items on the page may have changed the selection
        let value = self.values();
        if value == previous_value {
            self.render();
        } else {
            self.emit_change(ChangeDetail {
                clicked_index: None,
                is_selected: None,
                previous_value,
                value,
            });
        }
    }

    /// Drop unselected rows that only a search-term page brought in, so the
    /// main sequence keeps the source's page order once the search ends.
    fn prune_term_only(&mut self) {
        let dropped: HashSet<String> = std::mem::take(&mut self.term_only)
            .into_iter()
            .filter(|v| !self.native.find(v).is_some_and(|o| o.selected))
            .collect();
        if dropped.is_empty() {
            return;
        }
        tracing::debug!(message = "dropping search-only rows", count = dropped.len());
        self.native.remove_options(|o| dropped.contains(&o.value));
        self.rebuild();
    }

    // === Search ===

    /// Filter the menu by `term`. A blank term restores the main sequence.
    pub fn search(&mut self, term: &str) {
        let term = term.trim();
        let current = self.search_term();
        if current == Some(term) || (current.is_none() && term.is_empty()) {
            return;
        }
        self.release_mounted();
        self.viewport.reset();

        if term.is_empty() {
            self.search = None;
            self.search_paging.reset(None);
            self.prune_term_only();
            self.active = None;
            self.relayout_at(0.0);
            return;
        }

        let mut state = SearchState {
            term: term.to_string(),
            query: SearchQuery::new(
                term,
                self.config.live_search_style,
                self.config.live_search_normalize,
            ),
            fetched: HashSet::new(),
            rows: Vec::new(),
            index: PositionIndex::default(),
        };
        state.refilter(&self.main, self.oracle.size_info(), false);
        self.active = state.index.first_focusable();
        self.search = Some(state);
        if self.source.is_some() {
            self.search_paging.reset(Some(term.to_string()));
        }
        self.relayout_at(0.0);
    }

    // === Selection ===

    /// Selected values, in sequence order.
    pub fn values(&self) -> Vec<String> {
        crate::selection::selected_values(&self.main)
    }

    /// Select exactly `values`. Unknown values are ignored. Always fires one
    /// change notification.
    pub fn set_values<S: AsRef<str>>(&mut self, values: &[S]) {
        let values: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        let multiple = self.native.multiple;
        let detail = self.selection().set_values(&values, multiple);
        self.emit_change(detail);
    }

    /// Select every enabled option in the current sequence (multi-select only).
    pub fn select_all(&mut self) {
        self.change_all(true);
    }

    /// Deselect every enabled option in the current sequence (multi-select only).
    pub fn deselect_all(&mut self) {
        self.change_all(false);
    }

    fn change_all(&mut self, select: bool) {
        if !self.native.multiple {
            return;
        }
        let scope: Vec<usize> = self
            .rows()
            .iter()
            .filter(|r| r.is_option())
            .map(|r| r.data_index)
            .collect();
        let max = self.config.max_options.get();
        let (detail, hit) = self.selection().set_all(&scope, select, max);
        if let Some(limit) = hit {
            self.notify_limits(&[limit]);
        }
        if detail.value != detail.previous_value {
            self.emit_change(detail);
        }
    }

    /// Click (or Enter) on row `index` of the current sequence.
    pub fn click_row(&mut self, index: usize) {
        let Some(row) = self.rows().get(index).filter(|r| r.is_option()) else {
            return;
        };
        let data_index = row.data_index;
        let multiple = self.native.multiple;
        let allow_clear = self.config.allow_clear;
        let max = self.config.max_options.get();
        match self.selection().activate(data_index, multiple, allow_clear, max) {
            Activation::Changed { detail, close } => {
                self.set_active(Some(index));
                self.emit_change(detail);
                if close {
                    self.close();
                }
            }
            Activation::Unchanged { close } => {
                if close {
                    self.close();
                }
            }
            Activation::Rejected { data_index, limits } => {
                self.set_active(Some(index));
                self.notify_limits(&limits);
                self.timers
                    .schedule(REVERT_DELAY, Deferred::RevertElement { data_index });
            }
        }
    }

    fn emit_change(&mut self, detail: ChangeDetail) {
        self.native.dispatch_change();
        self.events.push(PickerEvent::Changed(detail));
        self.render();
    }

    fn notify_limits(&mut self, limits: &[Limit]) {
        let mut texts = Vec::new();
        let mut group = None;
        for limit in limits {
            match *limit {
                Limit::Global(limit) => {
                    let notice = self.config.limit_text(limit);
                    texts.push(notice.clone());
                    self.events.push(PickerEvent::MaxReached { limit, notice });
                }
                Limit::Group { group_id, limit } => {
                    let notice = self.config.group_limit_text(limit);
                    texts.push(notice.clone());
                    group = Some(group_id);
                    self.events.push(PickerEvent::MaxReachedGroup {
                        group_id,
                        limit,
                        notice,
                    });
                }
            }
        }
        self.notice = Some(LimitNotice {
            text: texts.join(" "),
            group_id: group,
        });
        self.timers.reschedule(NOTICE_DURATION, Deferred::HideNotice);
    }

    /// Recompute the button text from the current selection.
    pub fn render(&mut self) -> &ButtonText {
        self.button = self.button_text();
        self.events.push(PickerEvent::Rendered {
            button: self.button.clone(),
        });
        &self.button
    }

    fn button_text(&self) -> ButtonText {
        let selected: Vec<&RowDescriptor> = self
            .main
            .iter()
            .filter(|r| r.is_option() && r.selected)
            .collect();
        let empty_text = || {
            self.config
                .title
                .clone()
                .unwrap_or_else(|| self.config.none_selected_text.clone())
        };
        if selected.is_empty() {
            return ButtonText {
                text: empty_text(),
                title: None,
                placeholder: true,
            };
        }

        let joined = selected
            .iter()
            .map(|r| r.button_text())
            .collect::<Vec<_>>()
            .join(&self.config.multiple_separator);
        let n = selected.len();
        let total = self.main.iter().filter(|r| r.is_option()).count();
        let text = match self.config.selected_text_format {
            SelectedTextFormat::Static => empty_text(),
            SelectedTextFormat::Count if n > 1 => self.config.count_text(n, total),
            SelectedTextFormat::CountGreaterThan(k) if n > k => self.config.count_text(n, total),
            _ => joined.clone(),
        };
        ButtonText {
            text,
            title: Some(joined),
            placeholder: false,
        }
    }

    // === Focus ===

    fn set_active(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| self.current_index().is_focusable(i));
        let old = std::mem::replace(&mut self.active, index);
        if old == index {
            return;
        }
        let rows = self.rows_mut();
        for (i, active) in [(old, false), (index, true)] {
            if let Some(row) = i.and_then(|i| rows.get_mut(i)) {
                let shown = row.element.as_ref().map_or(row.selected, |e| e.selected);
                RowRenderer::patch_state(row, shown, active);
            }
        }
    }

    fn focus_row(&mut self, index: Option<usize>, align: ScrollAlign) {
        let Some(index) = index else {
            return;
        };
        self.set_active(Some(index));
        let Some(item) = self.current_index().item_layout(index) else {
            return;
        };
        let top = self.viewport.scroll_top();
        if let Some(target) = scroll_target(item, align, top, self.viewport.viewport_height()) {
            self.update_window(target);
        }
    }

    fn move_active(&mut self, dir: Direction) {
        let next = self.current_index().next_focusable(self.active, dir);
        self.focus_row(next, ScrollAlign::Auto);
    }

    fn move_page(&mut self, dir: Direction) {
        let index = self.current_index();
        let Some(current) = self.active.and_then(|i| index.item_layout(i)) else {
            self.move_active(dir);
            return;
        };
        let page = self.viewport.viewport_height();
        let (y, align) = match dir {
            Direction::Down => (current.y + page, ScrollAlign::End),
            Direction::Up => ((current.y - page).max(0.0), ScrollAlign::Start),
        };
        let target = index
            .row_at(y)
            .and_then(|row| index.focusable_from(row, dir));
        self.focus_row(target, align);
    }

    /// Keyboard input while the picker has focus.
    pub fn key_down(&mut self, key: Key) {
        if !self.open {
            if matches!(key, Key::Up | Key::Down) || key.is_activation() {
                self.open();
            }
            return;
        }
        if key.is_navigation() {
            self.type_buffer.clear();
        }
        match key {
            Key::Up => self.move_active(Direction::Up),
            Key::Down => self.move_active(Direction::Down),
            Key::PageUp => self.move_page(Direction::Up),
            Key::PageDown => self.move_page(Direction::Down),
            Key::Home => {
                let first = self.current_index().first_focusable();
                self.focus_row(first, ScrollAlign::Start);
            }
            Key::End => {
                let last = self.current_index().last_focusable();
                self.focus_row(last, ScrollAlign::End);
            }
            Key::Enter | Key::Space => {
                if let Some(i) = self.active {
                    self.click_row(i);
                }
            }
            Key::Tab => {
                if self.config.select_on_tab {
                    if let Some(i) = self.active {
                        self.click_row(i);
                    }
                }
                self.close();
            }
            Key::Escape => self.close(),
            Key::Backspace => {
                if self.config.live_search && self.search_input.pop().is_some() {
                    let input = self.search_input.clone();
                    self.search(&input);
                }
            }
            Key::Left | Key::Right => {}
        }
    }

    /// Printable input: feeds the search box when live search is on and the
    /// menu is open, otherwise type-ahead.
    pub fn type_text(&mut self, text: &str) {
        if self.config.live_search && self.open {
            self.search_input.push_str(text);
            let input = self.search_input.clone();
            self.search(&input);
            return;
        }
        self.type_ahead(text);
    }

    fn type_ahead(&mut self, text: &str) {
        self.type_buffer.push_str(&normalize(text, true));
        self.timers
            .reschedule(TYPE_AHEAD_RESET, Deferred::ClearTypeAhead);

        let buffer = self.type_buffer.clone();
        let Some(first) = buffer.chars().next() else {
            return;
        };
        let cycling = buffer.chars().all(|c| c == first);
        let needle = if cycling {
            first.to_string()
        } else {
            buffer
        };
        let index = self.current_index();
        let matches: Vec<usize> = self
            .rows()
            .iter()
            .enumerate()
            .filter(|&(i, r)| {
                index.is_focusable(i) && normalize(&r.display_text, true).starts_with(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        let target = if cycling {
            let after = self.active;
            matches
                .iter()
                .copied()
                .find(|&i| after.is_some_and(|a| i > a))
                .or_else(|| matches.first().copied())
        } else {
            matches.first().copied()
        };
        let Some(target) = target else {
            return;
        };

        if self.open {
            self.focus_row(Some(target), ScrollAlign::Auto);
        } else if !self.native.multiple {
            self.click_row(target);
        } else {
            self.set_active(Some(target));
        }
    }

    // === Timers ===

    /// Advance the clock by `elapsed` and run deferred work that came due.
    pub fn advance(&mut self, elapsed: Duration) {
        for task in self.timers.advance(elapsed) {
            match task {
                Deferred::RevertElement { data_index } => {
                    self.selection().revert_element(data_index);
                }
                Deferred::HideNotice => self.notice = None,
                Deferred::ClearTypeAhead => self.type_buffer.clear(),
            }
        }
    }

    // === Dropdown ===

    /// Open the menu.
    pub fn open(&mut self) {
        if self.open || self.native.disabled {
            return;
        }
        match self.toggle.as_mut() {
            Some(toggle) => toggle.open(),
            None => {
                self.on_dropdown(DropdownLifecycle::Show);
                self.on_dropdown(DropdownLifecycle::Shown);
            }
        }
    }

    /// Close the menu.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        match self.toggle.as_mut() {
            Some(toggle) => toggle.close(),
            None => {
                self.on_dropdown(DropdownLifecycle::Hide);
                self.on_dropdown(DropdownLifecycle::Hidden);
            }
        }
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Lifecycle report from the dropdown toggle.
    pub fn on_dropdown(&mut self, stage: DropdownLifecycle) {
        match stage {
            DropdownLifecycle::Show => {
                self.open = true;
                self.remeasure_if_invalid();
                self.relayout();
            }
            DropdownLifecycle::Shown => {
                if self.active.is_none() {
                    let index = self.current_index();
                    let target = self
                        .rows()
                        .iter()
                        .enumerate()
                        .find(|&(i, r)| r.selected && index.is_focusable(i))
                        .map(|(i, _)| i)
                        .or_else(|| index.first_focusable());
                    self.focus_row(target, ScrollAlign::Auto);
                }
                self.events.push(PickerEvent::Shown);
            }
            DropdownLifecycle::Hide => {}
            DropdownLifecycle::Hidden => {
                self.open = false;
                self.search_input.clear();
                self.search("");
                self.set_active(None);
                self.relayout_at(0.0);
                self.events.push(PickerEvent::Hidden);
            }
        }
    }

    // === Pointer ===

    fn pointer_down(&mut self, position: Point) {
        if self.bounds.contains_point(&position) {
            self.toggle();
            return;
        }
        if !self.open {
            return;
        }
        let menu = self.menu_rect();
        if !menu.contains_point(&position) {
            self.close();
            return;
        }

        let info = *self.oracle.size_info();
        let actions_top =
            menu.y + info.menu_padding_vertical / 2.0 + info.header_height + info.search_height;
        let list_top = actions_top + info.actions_height;
        let list_bottom = list_top + self.placement.inner_height;

        if position.y >= actions_top && position.y < list_top {
            if position.x < menu.center().x {
                self.select_all();
            } else {
                self.deselect_all();
            }
        } else if position.y >= list_bottom {
            if position.y < list_bottom + info.done_button_height {
                self.close();
            }
        } else if position.y >= list_top {
            let y = position.y - list_top + self.viewport.scroll_top();
            if let Some(i) = self.hit_row(y) {
                self.click_row(i);
            }
        }
    }

    /// Row under content offset `y`; nothing below the last row.
    fn hit_row(&self, y: f32) -> Option<usize> {
        let index = self.current_index();
        if y < 0.0 || y >= index.total_height() {
            return None;
        }
        index.row_at(y)
    }
}

impl Widget for SelectPicker {
    type Message = PickerEvent;

    fn type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn layout(&mut self, bounds: Rect) -> LayoutResult {
        self.bounds = bounds;
        self.relayout();
        LayoutResult {
            size: bounds.size(),
        }
    }

    fn event(&mut self, event: &Event) -> Vec<PickerEvent> {
        match event {
            Event::MouseDown {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(*position),
            Event::Scroll { offset } => {
                if self.open {
                    self.on_scroll(*offset);
                }
            }
            Event::KeyDown { key } => self.key_down(*key),
            Event::TextInput { text } => self.type_text(text),
            Event::Resize { width, height } => self.on_resize(Size::new(*width, *height)),
            Event::FocusOut => self.close(),
            _ => {}
        }
        self.drain_events()
    }

    fn is_focusable(&self) -> bool {
        !self.native.disabled
    }

    fn accessible_name(&self) -> Option<&str> {
        self.accessible_name.as_deref()
    }

    fn accessible_role(&self) -> AccessibleRole {
        AccessibleRole::ComboBox
    }

    fn test_id(&self) -> Option<&str> {
        self.test_id.as_deref()
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Bottom edge of the `n`-th (1-based) option row.
fn nth_option_bottom(rows: &[RowDescriptor], n: usize) -> Option<f32> {
    if n == 0 {
        return None;
    }
    rows.iter()
        .filter(|r| r.is_option())
        .nth(n - 1)
        .map(RowDescriptor::bottom_px)
}

/// Mirror a fetched item into the native select.
fn append_native(native: &mut NativeSelect, item: &SourceItem) {
    if item.value.is_empty() || native.contains(&item.value) {
        return;
    }
    let option = NativeOption {
        value: item.value.clone(),
        text: item.text.clone(),
        sub_text: item.sub_text.clone(),
        icon: item.icon.clone(),
        tokens: item.tokens.clone(),
        content: item.content.clone(),
        title: None,
        selected: item.selected,
        disabled: item.disabled,
        placeholder: false,
    };
    let Some(label) = &item.group else {
        native.push_option(option);
        return;
    };
    match native.children_mut().last_mut() {
        Some(NativeNode::Group(group)) if &group.label == label => group.options.push(option),
        _ => native
            .children_mut()
            .push(NativeNode::Group(NativeGroup::new(label.clone()).option(option))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fruit(multiple: bool) -> NativeSelect {
        let base = if multiple {
            NativeSelect::multiple()
        } else {
            NativeSelect::single()
        };
        base.option(NativeOption::new("a1", "Apple"))
            .option(NativeOption::new("b1", "Banana"))
            .option(NativeOption::new("c1", "Cherry"))
    }

    #[test]
    fn test_build_emits_initialized_and_rendered() {
        let mut p = SelectPicker::new(fruit(false), PickerConfig::default());
        let events = p.drain_events();
        assert!(events.contains(&PickerEvent::Initialized));
        assert!(events
            .iter()
            .any(|e| matches!(e, PickerEvent::Rendered { .. })));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn test_button_text_formats() {
        let config = PickerConfig {
            selected_text_format: SelectedTextFormat::CountGreaterThan(1),
            ..PickerConfig::default()
        };
        let mut p = SelectPicker::new(fruit(true), config);
        assert!(p.button().placeholder);
        assert_eq!(p.button().text, "Nothing selected");
        p.set_values(&["a1"]);
        assert_eq!(p.button().text, "Apple");
        p.set_values(&["a1", "c1"]);
        assert_eq!(p.button().text, "2 items selected");
        assert_eq!(p.button().title.as_deref(), Some("Apple, Cherry"));
    }

    #[test]
    fn test_title_inserts_placeholder() {
        let config = PickerConfig {
            title: Some("Choose".to_string()),
            ..PickerConfig::default()
        };
        let p = SelectPicker::new(fruit(false), config);
        assert!(p.native().has_placeholder());
        assert_eq!(p.native().value(), None);
        assert_eq!(p.button().text, "Choose");
        assert_eq!(p.rows().len(), 3);
    }

    #[test]
    fn test_open_close_without_toggle() {
        let mut p = SelectPicker::new(fruit(false), PickerConfig::default());
        p.drain_events();
        p.open();
        assert!(p.is_open());
        assert_eq!(p.active_index(), Some(0));
        p.close();
        assert!(!p.is_open());
        assert_eq!(p.drain_events(), vec![PickerEvent::Shown, PickerEvent::Hidden]);
    }

    #[test]
    fn test_click_single_closes_menu() {
        let mut p = SelectPicker::new(fruit(false), PickerConfig::default());
        p.open();
        p.click_row(1);
        assert_eq!(p.values(), vec!["b1"]);
        assert!(!p.is_open());
        assert_eq!(p.native().change_events(), 1);
    }

    #[test]
    fn test_focus_out_closes_menu() {
        let mut p = SelectPicker::new(fruit(true), PickerConfig::default());
        p.key_down(Key::Down);
        assert!(p.is_open());
        let events = p.event(&Event::FocusOut);
        assert!(!p.is_open());
        assert!(events.contains(&PickerEvent::Hidden));
    }

    #[test]
    fn test_menu_rect_below_button() {
        let mut p = SelectPicker::new(fruit(false), PickerConfig::default());
        p.layout(Rect::new(10.0, 20.0, 200.0, 38.0));
        let menu = p.menu_rect();
        assert_eq!(menu.y, 58.0);
        assert_eq!(menu.x, 10.0);
        assert!(menu.width >= 200.0);
    }

    #[test]
    fn test_pointer_selects_row() {
        let mut p = SelectPicker::new(fruit(true), PickerConfig::default());
        p.layout(Rect::new(0.0, 0.0, 200.0, 38.0));
        p.event(&Event::MouseDown {
            position: Point::new(5.0, 5.0),
            button: MouseButton::Left,
        });
        assert!(p.is_open());
        let menu = p.menu_rect();
        let pad = p.size_info().menu_padding_vertical / 2.0;
        // second row
        let events = p.event(&Event::MouseDown {
            position: Point::new(20.0, menu.y + pad + 40.0),
            button: MouseButton::Left,
        });
        assert_eq!(p.values(), vec!["b1"]);
        assert!(events.iter().any(PickerEvent::is_change));
    }

    #[test]
    fn test_append_native_groups() {
        let mut native = NativeSelect::multiple();
        append_native(&mut native, &SourceItem::new("a", "A").group("G"));
        append_native(&mut native, &SourceItem::new("b", "B").group("G"));
        append_native(&mut native, &SourceItem::new("c", "C"));
        append_native(&mut native, &SourceItem::new("c", "C"));
        assert_eq!(native.children().len(), 2);
        assert_eq!(native.option_count(), 3);
    }

    #[test]
    fn test_hit_row_ignores_space_below_last_row() {
        let mut p = SelectPicker::new(fruit(false), PickerConfig::default());
        let total = p.current_index().total_height();
        assert!(total > 0.0);
        assert_eq!(p.hit_row(0.0), Some(0));
        assert_eq!(p.hit_row(total - 1.0), Some(2));
        assert_eq!(p.hit_row(total), None);
        assert_eq!(p.hit_row(total + 40.0), None);
        assert_eq!(p.hit_row(-1.0), None);

        p.search("zz");
        assert_eq!(p.hit_row(0.0), None);
    }

    #[test]
    fn test_nth_option_bottom() {
        let mut rows = vec![
            RowDescriptor::group_label("G", 1),
            RowDescriptor::option("a", "A"),
            RowDescriptor::option("b", "B"),
        ];
        PositionIndex::reindex(&mut rows, &SizeInfo::default());
        assert_eq!(nth_option_bottom(&rows, 2), Some(96.0));
        assert_eq!(nth_option_bottom(&rows, 0), None);
        assert_eq!(nth_option_bottom(&rows, 5), None);
    }
}
