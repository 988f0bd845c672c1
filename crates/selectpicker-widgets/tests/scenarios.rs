//! End-to-end picker scenarios driven through the harness.

use selectpicker_core::Key;
use selectpicker_test::{
    grouped_select, numbered_select, FixedProbe, PickerHarness, RecordingSanitizer,
    RecordingToggle,
};
use selectpicker_widgets::{
    DropdownLifecycle, MaxOptions, NativeGroup, NativeOption, NativeSelect, PickerConfig,
    PickerEvent, RowKind, SelectPicker, SelectedTextFormat,
};

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

fn harness(native: NativeSelect, config: PickerConfig) -> PickerHarness {
    PickerHarness::new(SelectPicker::new(native, config))
}

fn kinds(picker: &SelectPicker) -> Vec<RowKind> {
    picker.rows().iter().map(|r| r.kind).collect()
}

// =========================================================================
// Model building
// =========================================================================

#[test]
fn test_plain_build_mirrors_native_selection() {
    let native = NativeSelect::single()
        .option(NativeOption::new("v1", "One"))
        .option(NativeOption::new("v2", "Two").selected(true))
        .option(NativeOption::new("v3", "Three"));
    let h = harness(native, PickerConfig::default());
    let rows = h.picker().rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.kind == RowKind::Option));
    let selected: Vec<bool> = rows.iter().map(|r| r.selected).collect();
    assert_eq!(selected, vec![false, true, false]);
    h.assert_button_text("Two");
}

#[test]
fn test_grouped_build_places_single_divider() {
    let native = NativeSelect::multiple()
        .group(
            NativeGroup::new("G1")
                .option(NativeOption::new("a", "A"))
                .option(NativeOption::new("b", "B")),
        )
        .option(NativeOption::new("c", "C"));
    let h = harness(native, PickerConfig::default());
    assert_eq!(
        kinds(h.picker()),
        vec![
            RowKind::GroupLabel,
            RowKind::Option,
            RowKind::Option,
            RowKind::Divider,
            RowKind::Option
        ]
    );
    assert_eq!(h.picker().rows()[0].display_text, "G1");
    assert_eq!(h.picker().rows()[0].group_id, Some(1));
}

#[test]
fn test_single_select_last_preselected_wins() {
    let native = NativeSelect::single()
        .option(NativeOption::new("a", "A").selected(true))
        .option(NativeOption::new("b", "B").selected(true));
    let h = harness(native, PickerConfig::default());
    h.assert_values(&["b"]).assert_mirrors_consistent();
    assert_eq!(h.picker().native().value(), Some("b"));
}

#[test]
fn test_hide_disabled_omits_rows() {
    let native = NativeSelect::multiple()
        .option(NativeOption::new("a", "A"))
        .option(NativeOption::new("b", "B").disabled(true))
        .group(
            NativeGroup::new("Off")
                .disabled(true)
                .option(NativeOption::new("c", "C")),
        );
    let config = PickerConfig {
        hide_disabled: true,
        ..PickerConfig::default()
    };
    let h = harness(native, config);
    assert_eq!(h.option_texts(), vec!["A"]);
}

// =========================================================================
// Programmatic selection
// =========================================================================

#[test]
fn test_set_values_fires_one_change() {
    let native = NativeSelect::multiple()
        .options((1..=5).map(|i| NativeOption::new(format!("v{i}"), format!("Value {i}"))));
    let mut h = harness(native, PickerConfig::default());
    h.take_events();

    h.picker_mut().set_values(&["v2", "v4", "missing"]);
    let events = h.take_events();
    let changes: Vec<&PickerEvent> = events.iter().filter(|e| e.is_change()).collect();
    assert_eq!(changes.len(), 1);
    let PickerEvent::Changed(detail) = changes[0] else {
        unreachable!()
    };
    assert!(detail.previous_value.is_empty());
    assert_eq!(detail.value, vec!["v2", "v4"]);

    h.assert_values(&["v2", "v4"]).assert_mirrors_consistent();
    assert_eq!(h.picker().native().change_events(), 1);
}

#[test]
fn test_set_values_replaces_previous_selection() {
    let mut h = harness(numbered_select(5, true), PickerConfig::default());
    h.picker_mut().set_values(&["v0", "v1"]);
    h.picker_mut().set_values(&["v3"]);
    h.assert_values(&["v3"]).assert_mirrors_consistent();
    assert_eq!(h.picker().native().change_events(), 2);
}

#[test]
fn test_set_values_single_keeps_one() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.picker_mut().set_values(&["a1", "c1"]);
    h.assert_values(&["c1"]);
}

#[test]
fn test_select_all_and_deselect_all_from_actions_box() {
    let config = PickerConfig {
        actions_box: true,
        ..PickerConfig::default()
    };
    let mut h = harness(numbered_select(4, true), config);
    h.click_button().click_select_all();
    h.assert_values(&["v0", "v1", "v2", "v3"]).assert_open(true);
    assert_eq!(h.changes(), 1);

    h.click_deselect_all();
    h.assert_values(&[]).assert_mirrors_consistent();
    assert_eq!(h.changes(), 2);
}

#[test]
fn test_select_all_stops_at_limit() {
    let config = PickerConfig {
        max_options: MaxOptions::limit(2),
        ..PickerConfig::default()
    };
    let mut h = harness(numbered_select(4, true), config);
    h.picker_mut().select_all();
    h.assert_values(&["v0", "v1"]);
    let events = h.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, PickerEvent::MaxReached { limit: 2, .. })));
    assert_eq!(events.iter().filter(|e| e.is_change()).count(), 1);
}

#[test]
fn test_select_all_ignored_in_single_select() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.take_events();
    h.picker_mut().select_all();
    h.assert_values(&[]);
    assert_eq!(h.take_events(), Vec::new());
}

// =========================================================================
// Clicks and limits
// =========================================================================

#[test]
fn test_single_click_replaces_and_closes() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.click_button().click_row(0);
    h.assert_values(&["a1"]).assert_open(false);
    h.click_button().click_row(2);
    h.assert_values(&["c1"]).assert_mirrors_consistent();
    assert_eq!(h.changes(), 2);
}

#[test]
fn test_single_click_on_selected_is_noop() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.picker_mut().set_values(&["b1"]);
    h.take_events();
    h.click_button().click_row(1);
    h.assert_values(&["b1"]).assert_open(false);
    assert_eq!(h.changes(), 0);
}

#[test]
fn test_allow_clear_deselects_single() {
    let config = PickerConfig {
        allow_clear: true,
        title: Some("Pick one".to_string()),
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(false), config);
    h.click_button().click_row(1);
    h.click_button().click_row(1);
    h.assert_values(&[]).assert_button_text("Pick one");
    assert_eq!(h.picker().native().value(), None);
}

#[test]
fn test_multi_click_toggles_independently() {
    let mut h = harness(fruit(true), PickerConfig::default());
    h.click_button().click_row(0).click_row(2);
    h.assert_values(&["a1", "c1"]).assert_open(true);
    h.click_row(0);
    h.assert_values(&["c1"]).assert_mirrors_consistent();
}

#[test]
fn test_limit_one_replaces_previous() {
    let config = PickerConfig {
        max_options: MaxOptions::limit(1),
        ..PickerConfig::default()
    };
    let mut h = harness(numbered_select(3, true), config);
    h.click_button().click_row(0).click_row(1);
    h.assert_values(&["v1"]).assert_mirrors_consistent();
    assert_eq!(h.count(|e| matches!(e, PickerEvent::MaxReached { .. })), 0);
}

#[test]
fn test_limit_rejects_then_reverts_element() {
    let config = PickerConfig {
        max_options: MaxOptions::limit(2),
        ..PickerConfig::default()
    };
    let mut h = harness(numbered_select(4, true), config);
    h.click_button().click_row(0).click_row(1).click_row(2);

    h.assert_values(&["v0", "v1"]);
    assert_eq!(h.changes(), 2);
    assert_eq!(h.count(|e| matches!(e, PickerEvent::MaxReached { limit: 2, .. })), 1);
    let notice = h.picker().notice().map(|n| n.text.clone());
    assert_eq!(notice.as_deref(), Some("Limit reached (2 items max)"));

    let row = &h.picker().rows()[2];
    assert!(!row.selected);
    assert!(row.element.as_ref().is_some_and(|e| e.selected));
    assert_eq!(h.picker().native().find("v2").map(|o| o.selected), Some(false));

    h.tick(10);
    assert!(h.picker().rows()[2]
        .element
        .as_ref()
        .is_some_and(|e| !e.selected));
    h.assert_mirrors_consistent();
    assert!(h.picker().notice().is_some());

    h.tick(990);
    assert!(h.picker().notice().is_none());
}

#[test]
fn test_group_limit_rejects() {
    let mut h = harness(grouped_select(true), PickerConfig::default());
    // rows: Solo, --, [Fruit], Apple, Banana, Cherry, --, [Veg], Carrot, Daikon
    h.click_button().click_row(3).click_row(4).click_row(5);
    h.assert_values(&["apple", "banana"]);
    assert_eq!(
        h.count(|e| matches!(
            e,
            PickerEvent::MaxReachedGroup {
                group_id: 1,
                limit: 2,
                ..
            }
        )),
        1
    );
    assert_eq!(h.picker().notice().and_then(|n| n.group_id), Some(1));

    // other groups are unaffected
    h.click_row(8);
    h.assert_values(&["apple", "banana", "carrot"]);
}

#[test]
fn test_group_limit_one_replaces_within_group() {
    let native = NativeSelect::multiple()
        .group(
            NativeGroup::new("Size")
                .max_options(1)
                .option(NativeOption::new("s", "S"))
                .option(NativeOption::new("m", "M")),
        )
        .option(NativeOption::new("x", "Extra"));
    let mut h = harness(native, PickerConfig::default());
    // rows: [Size], S, M, --, Extra
    h.click_button().click_row(1).click_row(4).click_row(2);
    h.assert_values(&["m", "x"]).assert_mirrors_consistent();
}

#[test]
fn test_clicks_on_dividers_and_labels_do_nothing() {
    let mut h = harness(grouped_select(true), PickerConfig::default());
    h.click_button().click_row(1).click_row(2);
    h.assert_values(&[]);
    assert_eq!(h.changes(), 0);
}

// =========================================================================
// Button text
// =========================================================================

#[test]
fn test_button_text_count_format() {
    let config = PickerConfig {
        selected_text_format: SelectedTextFormat::Count,
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(true), config);
    h.assert_button_text("Nothing selected");
    h.picker_mut().set_values(&["a1"]);
    h.assert_button_text("Apple");
    h.picker_mut().set_values(&["a1", "b1"]);
    h.assert_button_text("2 items selected");
}

#[test]
fn test_button_text_static_and_title() {
    let config = PickerConfig {
        selected_text_format: SelectedTextFormat::Static,
        title: Some("Fruit".to_string()),
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(true), config);
    h.picker_mut().set_values(&["a1", "b1"]);
    h.assert_button_text("Fruit");
    assert_eq!(h.picker().button().title.as_deref(), Some("Apple, Banana"));
}

#[test]
fn test_option_title_overrides_button_text() {
    let native = NativeSelect::single()
        .option(NativeOption::new("us", "United States of America").title("USA"));
    let mut h = harness(native, PickerConfig::default());
    h.picker_mut().set_values(&["us"]);
    h.assert_button_text("USA");
}

// =========================================================================
// Keyboard
// =========================================================================

#[test]
fn test_arrow_keys_open_and_wrap() {
    let mut h = harness(numbered_select(4, true), PickerConfig::default());
    h.press_key(Key::Down);
    h.assert_open(true);
    assert_eq!(h.picker().active_index(), Some(0));

    h.press_key(Key::Down).press_key(Key::Down);
    assert_eq!(h.picker().active_index(), Some(2));
    h.press_key(Key::Up).press_key(Key::Up).press_key(Key::Up);
    assert_eq!(h.picker().active_index(), Some(3));
    h.press_key(Key::Down);
    assert_eq!(h.picker().active_index(), Some(0));
    h.assert_values(&[]);
}

#[test]
fn test_arrows_skip_dividers_and_labels() {
    let mut h = harness(grouped_select(true), PickerConfig::default());
    h.press_key(Key::Down);
    assert_eq!(h.picker().active_index(), Some(0));
    h.press_key(Key::Down);
    assert_eq!(h.picker().active_index(), Some(3));
    h.press_key(Key::End);
    assert_eq!(h.picker().active_index(), Some(9));
    h.press_key(Key::Up).press_key(Key::Up);
    assert_eq!(h.picker().active_index(), Some(5));
}

#[test]
fn test_enter_selects_active_row() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.press_key(Key::Down).press_key(Key::Down).press_key(Key::Enter);
    h.assert_values(&["b1"]).assert_open(false);
}

#[test]
fn test_active_row_is_patched_on_element() {
    let mut h = harness(fruit(true), PickerConfig::default());
    h.press_key(Key::Down).press_key(Key::Down);
    let active: Vec<bool> = h
        .picker()
        .rows()
        .iter()
        .map(|r| r.element.as_ref().is_some_and(|e| e.active))
        .collect();
    assert_eq!(active, vec![false, true, false]);
}

#[test]
fn test_tab_selects_when_configured() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.press_key(Key::Down).press_key(Key::Down).press_key(Key::Tab);
    h.assert_values(&["b1"]).assert_open(false);

    let config = PickerConfig {
        select_on_tab: false,
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(false), config);
    h.press_key(Key::Down).press_key(Key::Down).press_key(Key::Tab);
    h.assert_values(&[]).assert_open(false);
}

#[test]
fn test_escape_closes_without_selecting() {
    let mut h = harness(fruit(true), PickerConfig::default());
    h.press_key(Key::Down).press_key(Key::Escape);
    h.assert_open(false).assert_values(&[]);
    assert_eq!(h.picker().active_index(), None);
}

#[test]
fn test_type_ahead_selects_when_closed() {
    let native = NativeSelect::single()
        .option(NativeOption::new("apple", "Apple"))
        .option(NativeOption::new("banana", "Banana"))
        .option(NativeOption::new("blueberry", "Blueberry"))
        .option(NativeOption::new("cherry", "Cherry"));
    let mut h = harness(native, PickerConfig::default());

    h.type_text("b");
    h.assert_values(&["banana"]);
    h.type_text("b");
    h.assert_values(&["blueberry"]);

    h.tick(800);
    h.type_text("c");
    h.assert_values(&["cherry"]);

    h.tick(800);
    h.type_text("bl");
    h.assert_values(&["blueberry"]);
}

#[test]
fn test_type_ahead_moves_focus_when_open() {
    let mut h = harness(fruit(true), PickerConfig::default());
    h.click_button();
    h.type_text("ch");
    assert_eq!(h.picker().active_index(), Some(2));
    h.assert_values(&[]);
}

// =========================================================================
// Search
// =========================================================================

#[test]
fn test_search_filters_and_restores() {
    let config = PickerConfig {
        live_search: true,
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(true), config);
    let before: Vec<_> = h
        .picker()
        .main_rows()
        .iter()
        .map(|r| (r.value.clone(), r.selected))
        .collect();

    h.click_button().type_text("b");
    assert!(h.picker().is_searching());
    assert_eq!(h.option_texts(), vec!["Banana"]);
    assert_eq!(h.picker().rows()[0].data_index, 1);

    h.press_key(Key::Backspace);
    assert!(!h.picker().is_searching());
    let after: Vec<_> = h
        .picker()
        .rows()
        .iter()
        .map(|r| (r.value.clone(), r.selected))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_selection_in_search_writes_through_to_main() {
    let config = PickerConfig {
        live_search: true,
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(true), config);
    h.click_button().type_text("an").click_row(0);
    h.assert_values(&["b1"]);
    assert!(h.picker().rows()[0].selected);

    h.press_key(Key::Backspace).press_key(Key::Backspace);
    assert!(h.picker().rows()[1].selected);
    h.assert_mirrors_consistent();
}

#[test]
fn test_search_keeps_group_labels() {
    let config = PickerConfig {
        live_search: true,
        ..PickerConfig::default()
    };
    let mut h = harness(grouped_select(true), config);
    h.click_button().type_text("a");
    // Banana, Carrot, Daikon and Apple contain "a"
    assert_eq!(
        kinds(h.picker()),
        vec![
            RowKind::GroupLabel,
            RowKind::Option,
            RowKind::Option,
            RowKind::Divider,
            RowKind::GroupLabel,
            RowKind::Option,
            RowKind::Option
        ]
    );
    assert_eq!(h.picker().active_index(), Some(1));
}

#[test]
fn test_search_no_results_text() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.picker_mut().search("zzz");
    assert!(h.option_texts().is_empty());
    assert_eq!(
        h.picker().no_results().as_deref(),
        Some("No results matched zzz")
    );
    h.picker_mut().search("  ");
    assert!(h.picker().no_results().is_none());
    assert_eq!(h.option_texts().len(), 3);
}

#[test]
fn test_search_normalize_folds_diacritics() {
    let native = NativeSelect::multiple()
        .option(NativeOption::new("c", "Crème brûlée"))
        .option(NativeOption::new("t", "Tart"));
    let config = PickerConfig {
        live_search_normalize: true,
        ..PickerConfig::default()
    };
    let mut h = harness(native, config);
    h.picker_mut().search("creme");
    assert_eq!(h.option_texts(), vec!["Crème brûlée"]);
}

#[test]
fn test_closing_clears_search() {
    let config = PickerConfig {
        live_search: true,
        ..PickerConfig::default()
    };
    let mut h = harness(fruit(true), config);
    h.click_button().type_text("ch");
    assert!(h.picker().is_searching());
    h.click_outside();
    assert!(!h.picker().is_searching());
    assert_eq!(h.option_texts().len(), 3);
}

// =========================================================================
// Lifecycle, collaborators and resync
// =========================================================================

#[test]
fn test_construction_notifications() {
    let h = harness(fruit(false), PickerConfig::default());
    assert_eq!(h.events()[0], PickerEvent::Initialized);
    assert_eq!(h.count(|e| matches!(e, PickerEvent::Rendered { .. })), 1);
}

#[test]
fn test_title_placeholder_submits_empty() {
    let config = PickerConfig {
        title: Some("Choose".to_string()),
        ..PickerConfig::default()
    };
    let h = harness(fruit(false), config);
    assert!(h.picker().native().has_placeholder());
    assert_eq!(h.picker().native().value(), None);
    assert!(h.picker().button().placeholder);
    assert_eq!(h.option_texts().len(), 3);
}

#[test]
fn test_external_mutation_resyncs() {
    let mut h = harness(numbered_select(4, true), PickerConfig::default());
    h.picker_mut().native_mut().set_selected("v3", true);
    h.picker_mut()
        .native_mut()
        .push_option(NativeOption::new("v4", "Item 4"));
    h.picker_mut().on_external_mutation();
    h.assert_values(&["v3"]).assert_button_text("Item 3");
    assert_eq!(h.option_texts().len(), 5);
    assert_eq!(h.take_events().last(), Some(&PickerEvent::Refreshed));
}

#[test]
fn test_external_mutation_during_search_keeps_row_content() {
    let native = NativeSelect::multiple()
        .option(NativeOption::new("a", "Alpha x").content("<b>ALPHA</b>"))
        .option(NativeOption::new("b", "Bravo x").content("<i>BRAVO</i>"));
    let mut h = harness(native, PickerConfig::default());
    h.click_button();
    h.picker_mut().search("x");
    assert_eq!(h.option_texts().len(), 2);

    h.picker_mut()
        .native_mut()
        .children_mut()
        .retain(|node| !matches!(node, selectpicker_widgets::NativeNode::Option(o) if o.value == "a"));
    h.picker_mut().on_external_mutation();

    let rows: Vec<_> = h.picker().rows().iter().filter(|r| r.is_option()).collect();
    assert_eq!(rows.len(), 1);
    let row = rows[0];
    assert_eq!(row.value, "b");
    let content = row.content.as_deref().unwrap_or_default();
    assert!(content.contains("BRAVO"));
    assert!(!content.contains("ALPHA"));
    let markup = row.element.as_ref().map(|e| e.markup.as_str()).unwrap_or_default();
    assert!(markup.contains("BRAVO"));
    assert!(!markup.contains("ALPHA"));
    assert_eq!(h.picker().search_term(), Some("x"));
}

#[test]
fn test_refresh_applies_new_config() {
    let mut h = harness(fruit(true), PickerConfig::default());
    h.picker_mut().set_values(&["a1", "b1"]);
    let config = PickerConfig {
        multiple_separator: " | ".to_string(),
        ..PickerConfig::default()
    };
    h.picker_mut().set_config(config);
    h.assert_button_text("Apple | Banana");
    assert!(h
        .take_events()
        .iter()
        .any(|e| *e == PickerEvent::Refreshed));
}

#[test]
fn test_probe_measures_once_until_refresh() {
    let probe = FixedProbe::new(30.0);
    let calls = probe.calls();
    let picker = SelectPicker::builder(numbered_select(5, true))
        .probe(probe)
        .build();
    let mut h = PickerHarness::new(picker);
    assert_eq!(calls.get(), 1);
    assert_eq!(h.picker().rows()[1].offset_px, 30.0);

    h.click_button().click_outside().click_button();
    assert_eq!(calls.get(), 1);

    h.picker_mut().refresh();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_detached_probe_keeps_cached_sizes_until_attached() {
    let probe = FixedProbe::new(30.0);
    let detached = probe.detached();
    detached.set(true);
    let picker = SelectPicker::builder(numbered_select(3, true))
        .probe(probe)
        .build();
    let mut h = PickerHarness::new(picker);
    assert!(!h.picker().oracle().is_valid());
    assert_eq!(h.picker().rows()[1].offset_px, 32.0);

    detached.set(false);
    h.click_button();
    assert!(h.picker().oracle().is_valid());
    assert_eq!(h.picker().rows()[1].offset_px, 30.0);
}

#[test]
fn test_sanitizer_runs_once_per_row() {
    let sanitizer = RecordingSanitizer::new();
    let calls = sanitizer.calls();
    let native = NativeSelect::multiple()
        .option(NativeOption::new("a", "A").content("<b>A</b><script>x()</script>"))
        .option(NativeOption::new("b", "B"));
    let picker = SelectPicker::builder(native).sanitizer(sanitizer).build();
    let mut h = PickerHarness::new(picker);
    assert_eq!(calls.get(), 1);
    assert_eq!(h.picker().rows()[0].content.as_deref(), Some("<b>A</b>"));

    h.click_button().click_row(0).click_row(0).click_outside();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_sanitize_disabled_skips_sanitizer() {
    let sanitizer = RecordingSanitizer::new();
    let calls = sanitizer.calls();
    let native = NativeSelect::multiple().option(NativeOption::new("a", "A").content("<i>A</i>"));
    let config = PickerConfig {
        sanitize: false,
        ..PickerConfig::default()
    };
    let _h = PickerHarness::new(
        SelectPicker::builder(native)
            .config(config)
            .sanitizer(sanitizer)
            .build(),
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_dropdown_toggle_drives_lifecycle() {
    let toggle = RecordingToggle::new();
    let log = toggle.log();
    let picker = SelectPicker::builder(fruit(true)).toggle(toggle).build();
    let mut h = PickerHarness::new(picker);

    h.click_button();
    assert_eq!(log.opens(), 1);
    h.assert_open(false);

    h.picker_mut().on_dropdown(DropdownLifecycle::Show);
    h.picker_mut().on_dropdown(DropdownLifecycle::Shown);
    h.assert_open(true);
    assert_eq!(h.picker().active_index(), Some(0));

    h.press_key(Key::Escape);
    assert_eq!(log.closes(), 1);
    h.assert_open(true);
    h.picker_mut().on_dropdown(DropdownLifecycle::Hide);
    h.picker_mut().on_dropdown(DropdownLifecycle::Hidden);
    h.assert_open(false);

    let events = h.take_events();
    assert!(events.contains(&PickerEvent::Shown));
    assert!(events.contains(&PickerEvent::Hidden));
}

#[test]
fn test_shown_focuses_selected_row() {
    let mut h = harness(fruit(false), PickerConfig::default());
    h.picker_mut().set_values(&["c1"]);
    h.click_button();
    assert_eq!(h.picker().active_index(), Some(2));
}

#[test]
fn test_disabled_select_does_not_open() {
    let mut native = fruit(false);
    native.disabled = true;
    let mut h = harness(native, PickerConfig::default());
    h.click_button();
    h.assert_open(false);
}

#[test]
fn test_config_from_yaml_drives_picker() {
    let config = PickerConfig::from_yaml(
        "
maxOptions: \"1\"
selectedTextFormat: count
noneSelectedText: Nothing yet
",
    )
    .unwrap_or_default();
    let mut h = harness(fruit(true), config);
    h.assert_button_text("Nothing yet");
    h.click_button().click_row(0).click_row(1);
    h.assert_values(&["b1"]);
}
