//! Live search over the main sequence.
//!
//! Filtering produces a separate search sequence. Matching rows are copied
//! without their rendered element; each copy keeps the `data_index` of its
//! authoritative row in the main sequence so selection writes go there.

use serde::{Deserialize, Serialize};

use crate::row::{RowDescriptor, RowKind};

/// How a term must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStyle {
    /// The term appears anywhere
    #[default]
    Contains,
    /// The text starts with the term
    StartsWith,
}

/// Lowercase `text`, optionally folding Latin diacritics to their base
/// letters.
pub fn normalize(text: &str, fold: bool) -> String {
    let lower = text.to_lowercase();
    if !fold {
        return lower;
    }
    let mut out = String::with_capacity(lower.len());
    for c in lower.chars() {
        match fold_char(c) {
            Some(base) => out.push_str(base),
            None => out.push(c),
        }
    }
    out
}

fn fold_char(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

/// A normalized search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
    style: SearchStyle,
    fold: bool,
}

impl SearchQuery {
    pub fn new(term: &str, style: SearchStyle, fold: bool) -> Self {
        Self {
            needle: normalize(term.trim(), fold),
            style,
            fold,
        }
    }

    /// True when the term is blank, which means "no search".
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    fn matches_text(&self, text: &str) -> bool {
        let hay = normalize(text, self.fold);
        match self.style {
            SearchStyle::Contains => hay.contains(&self.needle),
            SearchStyle::StartsWith => hay.starts_with(&self.needle),
        }
    }

    /// Whether an option row matches on its text, subtext or tokens.
    pub fn matches(&self, row: &RowDescriptor) -> bool {
        if !row.is_option() {
            return false;
        }
        self.matches_text(&row.display_text)
            || row.sub_text.as_deref().is_some_and(|s| self.matches_text(s))
            || row.tokens.iter().any(|t| self.matches_text(t))
    }
}

/// Build the search sequence for `query` from `main`.
///
/// Group labels are kept for groups with at least one match, and dividers
/// are placed between groups and ungrouped runs exactly as the model
/// builder places them.
pub fn filter(main: &[RowDescriptor], query: &SearchQuery) -> Vec<RowDescriptor> {
    filter_with(main, |row| query.matches(row))
}

/// Like [`filter`], with an arbitrary predicate over option rows.
pub fn filter_with(
    main: &[RowDescriptor],
    keep: impl Fn(&RowDescriptor) -> bool,
) -> Vec<RowDescriptor> {
    let mut out: Vec<RowDescriptor> = Vec::new();
    let mut last_group: Option<Option<usize>> = None;

    for row in main.iter().filter(|r| r.is_option() && keep(r)) {
        let group = row.group_id;
        if last_group != Some(group) {
            let crossing = last_group.is_some() && (group.is_some() || last_group != Some(None));
            if crossing && out.last().is_some_and(|r| !r.is_divider()) {
                out.push(RowDescriptor::divider());
            }
            if let Some(gid) = group {
                if let Some(label) = main
                    .iter()
                    .find(|r| r.kind == RowKind::GroupLabel && r.group_id == Some(gid))
                {
                    out.push(copy_row(label));
                }
            }
            last_group = Some(group);
        }
        out.push(copy_row(row));
    }
    out
}

fn copy_row(row: &RowDescriptor) -> RowDescriptor {
    RowDescriptor {
        element: None,
        ..row.clone()
    }
}
