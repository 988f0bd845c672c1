//! Row renderer: descriptor to visual element, memoized per descriptor.
//!
//! The element lives on the descriptor. Re-rendering the same descriptor
//! patches its markup and flags in place and keeps the [`ElementId`], so a
//! focused or scrolled-to row is never replaced under the user.

use crate::config::AllowList;
use crate::row::{ElementId, RowDescriptor, RowElement, RowKind};

/// Read-only view of the picker state handed to templates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PickerView {
    pub multiple: bool,
    pub show_subtext: bool,
    pub show_icon: bool,
    pub show_content: bool,
    pub show_tick: bool,
    pub icon_base: String,
    pub tick_icon: String,
    pub search_term: Option<String>,
}

/// Builds row markup.
pub trait TemplateProvider {
    fn option(&self, row: &RowDescriptor, view: &PickerView) -> String;
    fn divider(&self, row: &RowDescriptor, view: &PickerView) -> String;
    fn group_label(&self, row: &RowDescriptor, view: &PickerView) -> String;

    fn render(&self, row: &RowDescriptor, view: &PickerView) -> String {
        match row.kind {
            RowKind::Option => self.option(row, view),
            RowKind::Divider => self.divider(row, view),
            RowKind::GroupLabel => self.group_label(row, view),
        }
    }
}

/// Cleans free-form content against an allow list.
pub trait Sanitizer {
    fn sanitize(&mut self, fragment: &str, allow_list: &AllowList) -> String;
}

/// Sanitizer used when the host supplies none: escapes the whole fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeSanitizer;

impl Sanitizer for EscapeSanitizer {
    fn sanitize(&mut self, fragment: &str, _allow_list: &AllowList) -> String {
        escape(fragment)
    }
}

/// Escape text for inclusion in markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Bootstrap 5 dropdown markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapTemplates;

impl TemplateProvider for BootstrapTemplates {
    fn option(&self, row: &RowDescriptor, view: &PickerView) -> String {
        let mut classes = vec!["dropdown-item"];
        if row.selected {
            classes.push("selected");
        }
        if row.disabled {
            classes.push("disabled");
        }
        if row.group_id.is_some() {
            classes.push("opt");
        }

        let mut inner = String::new();
        if view.show_icon {
            if let Some(icon) = &row.icon {
                inner.push_str(&format!(
                    r#"<i class="{} {}"></i> "#,
                    escape(&view.icon_base),
                    escape(icon)
                ));
            }
        }
        match (&row.content, view.show_content) {
            (Some(content), true) => inner.push_str(content),
            _ => {
                inner.push_str(&format!(r#"<span class="text">{}"#, escape(&row.display_text)));
                if view.show_subtext {
                    if let Some(sub) = &row.sub_text {
                        inner.push_str(&format!(r#"<small class="text-muted">{}</small>"#, escape(sub)));
                    }
                }
                inner.push_str("</span>");
            }
        }
        if view.show_tick || view.multiple {
            inner.push_str(&format!(
                r#"<span class="{} {} check-mark"></span>"#,
                escape(&view.icon_base),
                escape(&view.tick_icon)
            ));
        }

        format!(
            r#"<li><a role="option" class="{}" aria-disabled="{}" aria-selected="{}" aria-posinset="{}">{}</a></li>"#,
            classes.join(" "),
            row.disabled,
            row.selected,
            row.pos_in_set,
            inner
        )
    }

    fn divider(&self, _row: &RowDescriptor, _view: &PickerView) -> String {
        r#"<li><div class="dropdown-divider" role="separator"></div></li>"#.to_string()
    }

    fn group_label(&self, row: &RowDescriptor, view: &PickerView) -> String {
        let gid = row.group_id.unwrap_or(0);
        let mut text = escape(&row.display_text);
        if view.show_subtext {
            if let Some(sub) = &row.sub_text {
                text.push_str(&format!(r#"<small class="text-muted">{}</small>"#, escape(sub)));
            }
        }
        format!(r#"<li class="dropdown-header optgroup-{gid}"><span class="text">{text}</span></li>"#)
    }
}

/// Materializes and releases row elements.
pub struct RowRenderer {
    next_id: u64,
    templates: Box<dyn TemplateProvider>,
    sanitizer: Box<dyn Sanitizer>,
    sanitize: bool,
    allow_list: AllowList,
    created: u64,
}

impl std::fmt::Debug for RowRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowRenderer")
            .field("next_id", &self.next_id)
            .field("sanitize", &self.sanitize)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl RowRenderer {
    pub fn new(
        templates: Box<dyn TemplateProvider>,
        sanitizer: Box<dyn Sanitizer>,
        sanitize: bool,
        allow_list: AllowList,
    ) -> Self {
        Self {
            next_id: 1,
            templates,
            sanitizer,
            sanitize,
            allow_list,
            created: 0,
        }
    }

    /// Change sanitizing settings after a refresh.
    pub fn configure(&mut self, sanitize: bool, allow_list: AllowList) {
        self.sanitize = sanitize;
        self.allow_list = allow_list;
    }

    /// Number of elements created so far.
    pub const fn created(&self) -> u64 {
        self.created
    }

    /// Create the row's element, or patch the existing one in place.
    pub fn materialize(
        &mut self,
        row: &mut RowDescriptor,
        view: &PickerView,
        active: bool,
    ) -> ElementId {
        if self.sanitize && !row.sanitized {
            if let Some(content) = row.content.take() {
                row.content = Some(self.sanitizer.sanitize(&content, &self.allow_list));
            }
            row.sanitized = true;
        }

        let markup = self.templates.render(row, view);
        match &mut row.element {
            Some(el) => {
                let dirty = el.markup != markup
                    || el.selected != row.selected
                    || el.active != active
                    || el.disabled != row.disabled
                    || !el.mounted;
                if dirty {
                    el.markup = markup;
                    el.selected = row.selected;
                    el.active = active;
                    el.disabled = row.disabled;
                    el.mounted = true;
                    el.patches += 1;
                }
                el.id
            }
            None => {
                let id = ElementId(self.next_id);
                self.next_id += 1;
                self.created += 1;
                row.element = Some(RowElement {
                    id,
                    markup,
                    selected: row.selected,
                    active,
                    disabled: row.disabled,
                    mounted: true,
                    patches: 0,
                });
                id
            }
        }
    }

    /// Update the rendered selected and active flags without re-templating.
    pub fn patch_state(row: &mut RowDescriptor, selected: bool, active: bool) {
        if let Some(el) = &mut row.element {
            if el.selected != selected || el.active != active {
                el.selected = selected;
                el.active = active;
                el.patches += 1;
            }
        }
    }

    /// Unmount the row's element, keeping its identity for reuse.
    pub fn release(row: &mut RowDescriptor) {
        if let Some(el) = &mut row.element {
            el.mounted = false;
        }
    }
}
