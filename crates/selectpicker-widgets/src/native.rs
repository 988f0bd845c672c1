//! The native select mirror.
//!
//! `NativeSelect` models the host form control the picker decorates. It is
//! the state external code observes (form submission, validation), so every
//! selection change the picker makes lands here before control returns to
//! the caller.

use serde::{Deserialize, Serialize};

/// A native `<option>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeOption {
    pub value: String,
    pub text: String,
    pub sub_text: Option<String>,
    pub icon: Option<String>,
    pub tokens: Vec<String>,
    pub content: Option<String>,
    pub title: Option<String>,
    pub selected: bool,
    pub disabled: bool,
    /// Reserved empty slot standing for "nothing selected"
    pub placeholder: bool,
}

impl NativeOption {
    /// Create a new option.
    #[must_use]
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set selected state.
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set disabled state.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the secondary text.
    #[must_use]
    pub fn sub_text(mut self, text: impl Into<String>) -> Self {
        self.sub_text = Some(text.into());
        self
    }

    /// Set search tokens.
    #[must_use]
    pub fn tokens(mut self, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Set free-form content.
    #[must_use]
    pub fn content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    /// Set the button title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A native `<optgroup>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeGroup {
    pub label: String,
    pub sub_text: Option<String>,
    pub icon: Option<String>,
    pub disabled: bool,
    pub max_options: Option<usize>,
    pub options: Vec<NativeOption>,
}

impl NativeGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Add an option.
    #[must_use]
    pub fn option(mut self, opt: NativeOption) -> Self {
        self.options.push(opt);
        self
    }

    /// Set disabled state.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Limit selections within this group.
    #[must_use]
    pub const fn max_options(mut self, max: usize) -> Self {
        self.max_options = Some(max);
        self
    }
}

/// A child of the native select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeNode {
    Option(NativeOption),
    Group(NativeGroup),
}

/// The native select element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeSelect {
    pub multiple: bool,
    pub disabled: bool,
    children: Vec<NativeNode>,
    #[serde(skip)]
    change_events: u64,
}

impl NativeSelect {
    /// A single-select control.
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// A multi-select control.
    #[must_use]
    pub fn multiple() -> Self {
        Self {
            multiple: true,
            ..Self::default()
        }
    }

    /// Add an option.
    #[must_use]
    pub fn option(mut self, opt: NativeOption) -> Self {
        self.children.push(NativeNode::Option(opt));
        self
    }

    /// Add options.
    #[must_use]
    pub fn options(mut self, opts: impl IntoIterator<Item = NativeOption>) -> Self {
        self.children
            .extend(opts.into_iter().map(NativeNode::Option));
        self
    }

    /// Add a group.
    #[must_use]
    pub fn group(mut self, group: NativeGroup) -> Self {
        self.children.push(NativeNode::Group(group));
        self
    }

    /// Append an option at the end.
    pub fn push_option(&mut self, opt: NativeOption) {
        self.children.push(NativeNode::Option(opt));
    }

    /// Remove every child.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn children(&self) -> &[NativeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<NativeNode> {
        &mut self.children
    }

    /// Remove the options matching `remove`; groups left empty go too.
    pub fn remove_options(&mut self, remove: impl Fn(&NativeOption) -> bool) {
        self.children.retain_mut(|node| match node {
            NativeNode::Option(o) => o.placeholder || !remove(o),
            NativeNode::Group(g) => {
                g.options.retain(|o| !remove(o));
                !g.options.is_empty()
            }
        });
    }

    /// All options in document order, groups flattened.
    pub fn options_iter(&self) -> impl Iterator<Item = &NativeOption> {
        self.children.iter().flat_map(|node| match node {
            NativeNode::Option(o) => std::slice::from_ref(o).iter(),
            NativeNode::Group(g) => g.options.iter(),
        })
    }

    /// All options in document order, mutable.
    pub fn options_iter_mut(&mut self) -> impl Iterator<Item = &mut NativeOption> {
        self.children.iter_mut().flat_map(|node| match node {
            NativeNode::Option(o) => std::slice::from_mut(o).iter_mut(),
            NativeNode::Group(g) => g.options.iter_mut(),
        })
    }

    /// Option with `value`.
    pub fn find(&self, value: &str) -> Option<&NativeOption> {
        self.options_iter().find(|o| o.value == value && !o.placeholder)
    }

    /// Whether an option with `value` exists.
    pub fn contains(&self, value: &str) -> bool {
        self.find(value).is_some()
    }

    /// Set the selected property of the option with `value`.
    ///
    /// In single-select mode selecting one option deselects the others, as a
    /// browser does. Returns `false` when no such option exists.
    pub fn set_selected(&mut self, value: &str, selected: bool) -> bool {
        let multiple = self.multiple;
        let mut found = false;
        for opt in self.options_iter_mut() {
            if opt.value == value && !opt.placeholder {
                opt.selected = selected;
                found = true;
            } else if selected && !multiple {
                opt.selected = false;
            }
        }
        if found && !selected && !multiple {
            self.select_placeholder();
        }
        found
    }

    /// Deselect every option.
    pub fn clear_selection(&mut self) {
        for opt in self.options_iter_mut() {
            opt.selected = false;
        }
        self.select_placeholder();
    }

    /// Values of the selected options, in document order.
    pub fn selected_values(&self) -> Vec<String> {
        self.options_iter()
            .filter(|o| o.selected && !o.placeholder)
            .map(|o| o.value.clone())
            .collect()
    }

    /// The form value: first selected option, or `None`.
    pub fn value(&self) -> Option<&str> {
        self.options_iter()
            .find(|o| o.selected && !o.placeholder)
            .map(|o| o.value.as_str())
    }

    /// Number of real (non-placeholder) options.
    pub fn option_count(&self) -> usize {
        self.options_iter().filter(|o| !o.placeholder).count()
    }

    pub fn has_placeholder(&self) -> bool {
        self.options_iter().any(|o| o.placeholder)
    }

    /// Insert the placeholder slot at the top, selected when nothing else is.
    pub fn insert_placeholder(&mut self) {
        if self.has_placeholder() {
            return;
        }
        let nothing_selected = self.value().is_none();
        let slot = NativeOption {
            placeholder: true,
            selected: nothing_selected,
            ..NativeOption::default()
        };
        self.children.insert(0, NativeNode::Option(slot));
    }

    fn select_placeholder(&mut self) {
        if self.multiple || self.value().is_some() {
            return;
        }
        if let Some(slot) = self.options_iter_mut().find(|o| o.placeholder) {
            slot.selected = true;
        }
    }

    /// Record a dispatched `change` event.
    pub fn dispatch_change(&mut self) {
        self.change_events += 1;
    }

    /// Number of `change` events dispatched so far.
    pub const fn change_events(&self) -> u64 {
        self.change_events
    }
}
