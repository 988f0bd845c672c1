//! Picker configuration.
//!
//! Loaded from YAML or JSON documents with camelCase keys. Every field has a
//! default, so a partial document only overrides what it names. Values that
//! parse but make no sense (a non-numeric `maxOptions`, an unknown
//! `selectedTextFormat`) fall back to a safe default instead of failing.

use selectpicker_core::{virtualization, PickerError, PickerResult, VirtualScroll};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::search::SearchStyle;

/// Singular/plural text pair, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plural(pub String, pub String);

impl Plural {
    /// Build a pair from the singular and plural forms.
    pub fn new(one: impl Into<String>, other: impl Into<String>) -> Self {
        Self(one.into(), other.into())
    }

    /// Pick the form for `n`.
    pub fn pick(&self, n: usize) -> &str {
        if n == 1 {
            &self.0
        } else {
            &self.1
        }
    }
}

/// Maximum number of selected options. `None` means no limit.
///
/// Accepts a number, a numeric string, `false` or `null`; anything else is
/// treated as no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawLimit", into = "RawLimit")]
pub struct MaxOptions(pub Option<usize>);

impl MaxOptions {
    /// No limit.
    pub const NONE: Self = Self(None);

    /// A limit of `n` (zero means no limit).
    pub const fn limit(n: usize) -> Self {
        if n == 0 {
            Self(None)
        } else {
            Self(Some(n))
        }
    }

    /// The limit, if any.
    pub const fn get(self) -> Option<usize> {
        self.0
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Flag(bool),
    Number(f64),
    Text(String),
    /// Lists, maps, null: no limit
    Other(serde_json::Value),
}

impl From<RawLimit> for MaxOptions {
    fn from(raw: RawLimit) -> Self {
        let n = match raw {
            RawLimit::Number(n) if n.is_finite() && n >= 1.0 => Some(n as usize),
            RawLimit::Text(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        };
        Self::limit(n.unwrap_or(0))
    }
}

impl From<MaxOptions> for RawLimit {
    fn from(m: MaxOptions) -> Self {
        match m.0 {
            Some(n) => Self::Number(n as f64),
            None => Self::Flag(false),
        }
    }
}

/// How tall the menu may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawSize", into = "RawSize")]
pub enum SizeMode {
    /// Fit the space between the button and the window edge
    #[default]
    Auto,
    /// Show this many option rows before scrolling
    Rows(usize),
    /// Never constrain the height
    Unbounded,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSize {
    Flag(bool),
    Rows(usize),
    Text(String),
    Other(serde_json::Value),
}

impl From<RawSize> for SizeMode {
    fn from(raw: RawSize) -> Self {
        match raw {
            RawSize::Flag(false) => Self::Unbounded,
            RawSize::Rows(n) if n > 0 => Self::Rows(n),
            RawSize::Text(s) => s
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .map_or(Self::Auto, Self::Rows),
            _ => Self::Auto,
        }
    }
}

impl From<SizeMode> for RawSize {
    fn from(s: SizeMode) -> Self {
        match s {
            SizeMode::Auto => Self::Text("auto".to_string()),
            SizeMode::Rows(n) => Self::Rows(n),
            SizeMode::Unbounded => Self::Flag(false),
        }
    }
}

/// How the button summarizes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectedTextFormat {
    /// Join the selected texts with the separator
    #[default]
    Values,
    /// Always show the title (or the none-selected text)
    Static,
    /// Show a count once more than one option is selected
    Count,
    /// Show a count once more than `n` options are selected
    CountGreaterThan(usize),
}

impl From<String> for SelectedTextFormat {
    fn from(s: String) -> Self {
        let s = s.trim();
        match s {
            "values" => Self::Values,
            "static" => Self::Static,
            "count" => Self::Count,
            _ => s
                .strip_prefix("count")
                .map(str::trim_start)
                .and_then(|rest| rest.strip_prefix('>'))
                .and_then(|n| n.trim().parse::<usize>().ok())
                .map_or(Self::Values, Self::CountGreaterThan),
        }
    }
}

impl From<SelectedTextFormat> for String {
    fn from(f: SelectedTextFormat) -> Self {
        match f {
            SelectedTextFormat::Values => "values".to_string(),
            SelectedTextFormat::Static => "static".to_string(),
            SelectedTextFormat::Count => "count".to_string(),
            SelectedTextFormat::CountGreaterThan(n) => format!("count > {n}"),
        }
    }
}

/// Paged data source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    /// Items requested per page
    pub page_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { page_size: 40 }
    }
}

/// Tag name to allowed attribute names, handed to the sanitizer.
pub type AllowList = BTreeMap<String, Vec<String>>;

/// The allow list used when none is configured.
pub fn default_allow_list() -> AllowList {
    let global = ["class", "dir", "id", "lang", "role", "tabindex", "style"];
    let mut list = AllowList::new();
    list.insert(
        "*".to_string(),
        global.iter().map(ToString::to_string).collect(),
    );
    for tag in [
        "b", "br", "div", "em", "i", "li", "ol", "p", "small", "span", "strong", "sub", "sup",
        "u", "ul",
    ] {
        list.insert(tag.to_string(), Vec::new());
    }
    list.insert(
        "a".to_string(),
        vec!["target".to_string(), "href".to_string(), "title".to_string()],
    );
    list.insert(
        "img".to_string(),
        ["src", "alt", "title", "width", "height"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    );
    list
}

/// Configuration for a [`crate::SelectPicker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    pub none_selected_text: String,
    /// `{0}` is replaced by the search term
    pub none_results_text: String,
    /// `{0}` is the selected count, `{1}` the total option count
    pub count_selected_text: Plural,
    /// `{n}` is the limit
    pub max_options_text: Plural,
    /// `{n}` is the group limit
    pub max_options_group_text: Plural,
    pub select_all_text: String,
    pub deselect_all_text: String,
    pub done_button: bool,
    pub done_button_text: String,
    pub multiple_separator: String,
    pub size: SizeMode,
    pub title: Option<String>,
    pub allow_clear: bool,
    pub selected_text_format: SelectedTextFormat,
    pub hide_disabled: bool,
    pub show_subtext: bool,
    pub show_icon: bool,
    pub show_content: bool,
    pub show_tick: bool,
    pub icon_base: String,
    pub tick_icon: String,
    pub dropup_auto: bool,
    pub header: Option<String>,
    pub live_search: bool,
    pub live_search_placeholder: Option<String>,
    pub live_search_style: SearchStyle,
    pub live_search_normalize: bool,
    pub actions_box: bool,
    pub max_options: MaxOptions,
    pub select_on_tab: bool,
    pub window_padding: f32,
    pub virtual_scroll: VirtualScroll,
    pub chunk_size: usize,
    pub sanitize: bool,
    pub white_list: AllowList,
    pub source: SourceConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            none_selected_text: "Nothing selected".to_string(),
            none_results_text: "No results matched {0}".to_string(),
            count_selected_text: Plural::new("{0} item selected", "{0} items selected"),
            max_options_text: Plural::new(
                "Limit reached ({n} item max)",
                "Limit reached ({n} items max)",
            ),
            max_options_group_text: Plural::new(
                "Group limit reached ({n} item max)",
                "Group limit reached ({n} items max)",
            ),
            select_all_text: "Select All".to_string(),
            deselect_all_text: "Deselect All".to_string(),
            done_button: false,
            done_button_text: "Close".to_string(),
            multiple_separator: ", ".to_string(),
            size: SizeMode::Auto,
            title: None,
            allow_clear: false,
            selected_text_format: SelectedTextFormat::Values,
            hide_disabled: false,
            show_subtext: false,
            show_icon: true,
            show_content: true,
            show_tick: false,
            icon_base: "bi".to_string(),
            tick_icon: "bi-check".to_string(),
            dropup_auto: true,
            header: None,
            live_search: false,
            live_search_placeholder: None,
            live_search_style: SearchStyle::Contains,
            live_search_normalize: false,
            actions_box: false,
            max_options: MaxOptions::NONE,
            select_on_tab: true,
            window_padding: 0.0,
            virtual_scroll: VirtualScroll::default(),
            chunk_size: virtualization::DEFAULT_CHUNK_SIZE,
            sanitize: true,
            white_list: default_allow_list(),
            source: SourceConfig::default(),
        }
    }
}

impl PickerConfig {
    /// Parse a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value is unusable.
    pub fn from_yaml(yaml: &str) -> PickerResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validated()
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is unusable.
    pub fn from_json(json: &str) -> PickerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> PickerResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    fn validated(self) -> PickerResult<Self> {
        if self.chunk_size == 0 {
            return Err(PickerError::InvalidValue {
                field: "chunkSize".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.source.page_size == 0 {
            return Err(PickerError::InvalidValue {
                field: "source.pageSize".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// `noneResultsText` with the search term filled in.
    pub fn no_results_text(&self, term: &str) -> String {
        self.none_results_text.replace("{0}", term)
    }

    /// Count summary for `selected` of `total` options.
    pub fn count_text(&self, selected: usize, total: usize) -> String {
        self.count_selected_text
            .pick(selected)
            .replace("{0}", &selected.to_string())
            .replace("{1}", &total.to_string())
    }

    /// Global limit notice.
    pub fn limit_text(&self, limit: usize) -> String {
        self.max_options_text
            .pick(limit)
            .replace("{n}", &limit.to_string())
    }

    /// Group limit notice.
    pub fn group_limit_text(&self, limit: usize) -> String {
        self.max_options_group_text
            .pick(limit)
            .replace("{n}", &limit.to_string())
    }
}
