//! Option model builder: flattens options and groups into row descriptors.
//!
//! Rules applied while flattening:
//! - options with an empty value (including the placeholder slot) never
//!   become rows
//! - a group contributes a label row followed by its options; empty groups
//!   contribute nothing
//! - one divider separates a group from whatever precedes or follows it, and
//!   a divider is never emitted directly after another divider
//! - group ids are 1-based and assigned in emission order

use crate::native::{NativeGroup, NativeNode, NativeOption, NativeSelect};
use crate::row::{RowDescriptor, RowKind};
use crate::source::SourceItem;

/// Builds row sequences from the native select or from fetched pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionModelBuilder {
    /// Omit disabled options and disabled groups
    pub hide_disabled: bool,
    pub multiple: bool,
}

/// Where the previously emitted content row belonged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Ungrouped,
    Group(usize),
}

impl OptionModelBuilder {
    pub const fn new(multiple: bool, hide_disabled: bool) -> Self {
        Self {
            hide_disabled,
            multiple,
        }
    }

    /// Build the main sequence from the native select.
    ///
    /// In single-select mode at most one row comes out selected; when the
    /// native control reports several, the last one wins.
    pub fn build(&self, native: &NativeSelect) -> Vec<RowDescriptor> {
        let mut rows = Vec::new();
        let mut run = None;
        let mut next_group = 1;

        for node in native.children() {
            match node {
                NativeNode::Option(opt) => {
                    if !self.keeps(opt, false) {
                        continue;
                    }
                    if matches!(run, Some(Run::Group(_))) {
                        push_divider(&mut rows);
                    }
                    push_row(&mut rows, option_row(opt, None, false));
                    run = Some(Run::Ungrouped);
                }
                NativeNode::Group(group) => {
                    if group.disabled && self.hide_disabled {
                        continue;
                    }
                    let kept: Vec<&NativeOption> = group
                        .options
                        .iter()
                        .filter(|o| self.keeps(o, group.disabled))
                        .collect();
                    if kept.is_empty() {
                        continue;
                    }
                    let gid = next_group;
                    next_group += 1;
                    if run.is_some() {
                        push_divider(&mut rows);
                    }
                    push_row(&mut rows, label_row(group, gid));
                    for opt in kept {
                        push_row(&mut rows, option_row(opt, Some(gid), group.disabled));
                    }
                    run = Some(Run::Group(gid));
                }
            }
        }

        if !self.multiple {
            keep_last_selected(&mut rows);
        }
        rows
    }

    /// Append a fetched page to an existing sequence.
    ///
    /// Items whose value already has a row are skipped. Consecutive items
    /// sharing a group label form one group; a page that continues the group
    /// the previous page ended in extends it without a new label.
    pub fn append_page(&self, rows: &mut Vec<RowDescriptor>, items: &[SourceItem]) -> usize {
        let mut next_group = rows.iter().filter_map(|r| r.group_id).max().unwrap_or(0) + 1;
        let mut current: Option<(String, usize)> = open_group(rows);
        let mut run = rows.last().map(|r| match r.group_id {
            Some(g) => Run::Group(g),
            None => Run::Ungrouped,
        });
        let before = rows.len();

        for item in items {
            if item.value.is_empty() || (self.hide_disabled && item.disabled) {
                continue;
            }
            if rows.iter().any(|r| r.is_option() && r.value == item.value) {
                continue;
            }
            let gid = match &item.group {
                None => {
                    if matches!(run, Some(Run::Group(_))) {
                        push_divider(rows);
                    }
                    current = None;
                    run = Some(Run::Ungrouped);
                    None
                }
                Some(label) => match &current {
                    Some((open, gid)) if open == label => Some(*gid),
                    _ => {
                        let gid = next_group;
                        next_group += 1;
                        if run.is_some() {
                            push_divider(rows);
                        }
                        push_row(rows, RowDescriptor::group_label(label.clone(), gid));
                        current = Some((label.clone(), gid));
                        run = Some(Run::Group(gid));
                        Some(gid)
                    }
                },
            };
            push_row(rows, item_row(item, gid));
        }

        if !self.multiple {
            keep_last_selected(rows);
        }
        rows.len() - before
    }

    fn keeps(&self, opt: &NativeOption, group_disabled: bool) -> bool {
        if opt.value.is_empty() || opt.placeholder {
            return false;
        }
        !(self.hide_disabled && (opt.disabled || group_disabled))
    }
}

fn option_row(opt: &NativeOption, group_id: Option<usize>, group_disabled: bool) -> RowDescriptor {
    RowDescriptor {
        kind: RowKind::Option,
        display_text: opt.text.clone(),
        sub_text: opt.sub_text.clone(),
        tokens: opt.tokens.clone(),
        icon: opt.icon.clone(),
        content: opt.content.clone(),
        title: opt.title.clone(),
        value: opt.value.clone(),
        selected: opt.selected,
        disabled: opt.disabled || group_disabled,
        group_id,
        ..RowDescriptor::default()
    }
}

fn label_row(group: &NativeGroup, gid: usize) -> RowDescriptor {
    RowDescriptor {
        sub_text: group.sub_text.clone(),
        icon: group.icon.clone(),
        disabled: group.disabled,
        group_max: group.max_options.filter(|&n| n > 0),
        ..RowDescriptor::group_label(group.label.clone(), gid)
    }
}

fn item_row(item: &SourceItem, group_id: Option<usize>) -> RowDescriptor {
    RowDescriptor {
        kind: RowKind::Option,
        display_text: item.text.clone(),
        sub_text: item.sub_text.clone(),
        tokens: item.tokens.clone(),
        icon: item.icon.clone(),
        content: item.content.clone(),
        value: item.value.clone(),
        selected: item.selected,
        disabled: item.disabled,
        group_id,
        ..RowDescriptor::default()
    }
}

/// The group the sequence currently ends in, with its label.
fn open_group(rows: &[RowDescriptor]) -> Option<(String, usize)> {
    let gid = rows.last()?.group_id?;
    let label = rows
        .iter()
        .rev()
        .find(|r| r.kind == RowKind::GroupLabel && r.group_id == Some(gid))?;
    Some((label.display_text.clone(), gid))
}

fn push_row(rows: &mut Vec<RowDescriptor>, mut row: RowDescriptor) {
    row.data_index = rows.len();
    rows.push(row);
}

fn push_divider(rows: &mut Vec<RowDescriptor>) {
    if rows.last().is_some_and(|r| !r.is_divider()) {
        push_row(rows, RowDescriptor::divider());
    }
}

fn keep_last_selected(rows: &mut [RowDescriptor]) {
    let Some(last) = rows.iter().rposition(|r| r.is_option() && r.selected) else {
        return;
    };
    for (i, row) in rows.iter_mut().enumerate() {
        if i != last {
            row.selected = false;
        }
    }
}
