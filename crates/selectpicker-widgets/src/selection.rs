//! Selection/focus synchronizer.
//!
//! Every selection write goes through [`Selection::set_row_selected`], which
//! updates the authoritative main-sequence row, its copy in the search
//! sequence (if any), the rendered element, and the native mirror together.
//! Indices that no longer resolve to an option row are ignored: descriptors
//! are replaced wholesale on search and refresh, so a late event may name a
//! row that is gone.

use std::collections::HashSet;

use crate::messages::ChangeDetail;
use crate::native::NativeSelect;
use crate::render::RowRenderer;
use crate::row::{group_label_of, RowDescriptor};

/// A limit that blocked a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Global(usize),
    Group { group_id: usize, limit: usize },
}

/// Result of activating (clicking or pressing Enter on) a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Nothing changed
    Unchanged { close: bool },
    Changed { detail: ChangeDetail, close: bool },
    /// The selection was refused; the row's element shows it selected until
    /// the revert timer fires
    Rejected { data_index: usize, limits: Vec<Limit> },
}

/// Mutable view over everything a selection change must keep consistent.
pub struct Selection<'a> {
    pub main: &'a mut [RowDescriptor],
    pub search: Option<&'a mut [RowDescriptor]>,
    pub native: &'a mut NativeSelect,
}

impl Selection<'_> {
    /// Values of the selected rows, in sequence order.
    pub fn values(&self) -> Vec<String> {
        selected_values(self.main)
    }

    fn option_at(&self, data_index: usize) -> Option<&RowDescriptor> {
        self.main.get(data_index).filter(|r| r.is_option())
    }

    /// Set one row's selected state everywhere it is represented.
    ///
    /// Returns `false` (and changes nothing) when `data_index` is not an
    /// option row.
    pub fn set_row_selected(&mut self, data_index: usize, selected: bool) -> bool {
        let Some(row) = self.main.get_mut(data_index).filter(|r| r.is_option()) else {
            return false;
        };
        row.selected = selected;
        sync_element(row);
        let value = row.value.clone();

        if let Some(search) = self.search.as_deref_mut() {
            if let Some(copy) = search.iter_mut().find(|r| r.is_option() && r.data_index == data_index) {
                copy.selected = selected;
                sync_element(copy);
            }
        }
        self.native.set_selected(&value, selected);
        true
    }

    fn deselect_where(&mut self, keep: usize, pred: impl Fn(&RowDescriptor) -> bool) {
        let targets: Vec<usize> = self
            .main
            .iter()
            .filter(|r| r.is_option() && r.selected && r.data_index != keep && pred(r))
            .map(|r| r.data_index)
            .collect();
        for i in targets {
            self.set_row_selected(i, false);
        }
    }

    /// Click or Enter on a row.
    pub fn activate(
        &mut self,
        data_index: usize,
        multiple: bool,
        allow_clear: bool,
        max_options: Option<usize>,
    ) -> Activation {
        let Some(row) = self.option_at(data_index) else {
            return Activation::Unchanged { close: false };
        };
        if row.disabled {
            return Activation::Unchanged { close: false };
        }
        let was_selected = row.selected;
        let group_id = row.group_id;
        let previous_value = self.values();

        if !multiple {
            if was_selected && !allow_clear {
                return Activation::Unchanged { close: true };
            }
            if was_selected {
                self.set_row_selected(data_index, false);
            } else {
                self.deselect_where(data_index, |_| true);
                self.set_row_selected(data_index, true);
            }
            return Activation::Changed {
                detail: self.detail(data_index, !was_selected, previous_value),
                close: true,
            };
        }

        if was_selected {
            self.set_row_selected(data_index, false);
            return Activation::Changed {
                detail: self.detail(data_index, false, previous_value),
                close: false,
            };
        }

        let group_max = group_id
            .and_then(|gid| group_label_of(self.main, gid))
            .and_then(|label| label.group_max);
        let selected = count_selected(self.main, None);
        let in_group = group_id.map_or(0, |gid| count_selected(self.main, Some(gid)));

        let global_over = max_options.is_some_and(|m| selected + 1 > m);
        let group_over = group_max.is_some_and(|m| in_group + 1 > m);
        let group_replace = group_over && group_max == Some(1);
        let freed = if group_replace { in_group } else { 0 };

        if global_over && max_options == Some(1) {
            self.deselect_where(data_index, |_| true);
        } else {
            let mut limits = Vec::new();
            if max_options.is_some_and(|m| selected - freed + 1 > m) {
                limits.extend(max_options.map(Limit::Global));
            }
            if group_over && !group_replace {
                if let (Some(gid), Some(limit)) = (group_id, group_max) {
                    limits.push(Limit::Group {
                        group_id: gid,
                        limit,
                    });
                }
            }
            if !limits.is_empty() {
                self.show_rejected(data_index);
                tracing::debug!(message = "selection limit reached", data_index, limits = ?limits);
                return Activation::Rejected { data_index, limits };
            }
            if group_replace {
                self.deselect_where(data_index, |r| r.group_id == group_id);
            }
        }

        self.set_row_selected(data_index, true);
        Activation::Changed {
            detail: self.detail(data_index, true, previous_value),
            close: false,
        }
    }

    /// Mark the rejected row's element selected while the descriptor and
    /// native option stay unselected.
    fn show_rejected(&mut self, data_index: usize) {
        if let Some(row) = self.main.get_mut(data_index) {
            let active = row.element.as_ref().is_some_and(|e| e.active);
            RowRenderer::patch_state(row, true, active);
        }
        if let Some(search) = self.search.as_deref_mut() {
            if let Some(copy) = search.iter_mut().find(|r| r.is_option() && r.data_index == data_index) {
                let active = copy.element.as_ref().is_some_and(|e| e.active);
                RowRenderer::patch_state(copy, true, active);
            }
        }
    }

    /// Bring the rendered elements of `data_index` back in line with the
    /// descriptor.
    pub fn revert_element(&mut self, data_index: usize) {
        if let Some(row) = self.main.get_mut(data_index) {
            sync_element(row);
        }
        if let Some(search) = self.search.as_deref_mut() {
            if let Some(copy) = search.iter_mut().find(|r| r.is_option() && r.data_index == data_index) {
                sync_element(copy);
            }
        }
    }

    /// Select exactly the rows whose values are in `values`.
    ///
    /// Unknown values are ignored. In single-select mode only the last
    /// matching row is kept.
    pub fn set_values(&mut self, values: &[String], multiple: bool) -> ChangeDetail {
        let previous_value = self.values();
        let wanted: HashSet<&str> = values.iter().map(String::as_str).collect();
        let mut matches: Vec<usize> = self
            .main
            .iter()
            .filter(|r| r.is_option() && wanted.contains(r.value.as_str()))
            .map(|r| r.data_index)
            .collect();
        if !multiple {
            matches = matches.last().copied().into_iter().collect();
        }
        let targets: Vec<(usize, bool)> = self
            .main
            .iter()
            .filter(|r| r.is_option())
            .map(|r| (r.data_index, matches.contains(&r.data_index)))
            .filter(|&(i, want)| self.main[i].selected != want)
            .collect();
        for (i, want) in targets {
            self.set_row_selected(i, want);
        }
        ChangeDetail {
            clicked_index: None,
            is_selected: None,
            previous_value,
            value: self.values(),
        }
    }

    /// Select or deselect every enabled option among `scope` (indices into
    /// the main sequence), respecting the global limit when selecting.
    ///
    /// Returns the change and, if selection stopped at the limit, that limit.
    pub fn set_all(
        &mut self,
        scope: &[usize],
        select: bool,
        max_options: Option<usize>,
    ) -> (ChangeDetail, Option<Limit>) {
        let previous_value = self.values();
        let mut selected = count_selected(self.main, None);
        let mut hit = None;
        for &i in scope {
            let Some(row) = self.option_at(i) else {
                continue;
            };
            if row.disabled || row.selected == select {
                continue;
            }
            if select {
                if let Some(m) = max_options.filter(|&m| selected >= m) {
                    hit = Some(Limit::Global(m));
                    break;
                }
                selected += 1;
            }
            self.set_row_selected(i, select);
        }
        let detail = ChangeDetail {
            clicked_index: None,
            is_selected: Some(select),
            previous_value,
            value: self.values(),
        };
        (detail, hit)
    }

    fn detail(&self, data_index: usize, is_selected: bool, previous_value: Vec<String>) -> ChangeDetail {
        ChangeDetail {
            clicked_index: Some(data_index),
            is_selected: Some(is_selected),
            previous_value,
            value: self.values(),
        }
    }
}

fn sync_element(row: &mut RowDescriptor) {
    let active = row.element.as_ref().is_some_and(|e| e.active);
    RowRenderer::patch_state(row, row.selected, active);
}

/// Values of the selected option rows.
pub fn selected_values(rows: &[RowDescriptor]) -> Vec<String> {
    rows.iter()
        .filter(|r| r.is_option() && r.selected)
        .map(|r| r.value.clone())
        .collect()
}

/// Selected option rows, optionally restricted to one group.
pub fn count_selected(rows: &[RowDescriptor], group_id: Option<usize>) -> usize {
    rows.iter()
        .filter(|r| r.is_option() && r.selected)
        .filter(|r| group_id.is_none() || r.group_id == group_id)
        .count()
}
