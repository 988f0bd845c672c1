//! Paged external data source plumbing.
//!
//! The picker asks a [`DataSource`] for a page and carries on; the host
//! answers later through [`crate::SelectPicker::on_fetch_complete`]. Each
//! request carries the generation it was issued under, so an answer that
//! arrives after a refresh or a new search term is recognised as stale and
//! dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One record delivered by a paged source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceItem {
    pub value: String,
    pub text: String,
    pub sub_text: Option<String>,
    pub icon: Option<String>,
    pub tokens: Vec<String>,
    pub content: Option<String>,
    pub disabled: bool,
    pub selected: bool,
    /// Label of the group this item belongs to
    pub group: Option<String>,
}

impl SourceItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Place the item in a group.
    #[must_use]
    pub fn group(mut self, label: impl Into<String>) -> Self {
        self.group = Some(label.into());
        self
    }
}

/// Identity of a page for in-flight de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: usize,
    pub search_term: Option<String>,
}

/// A page request handed to the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Zero-based page number
    pub page: usize,
    pub page_size: usize,
    pub search_term: Option<String>,
    /// Generation marker captured when the request was issued
    pub generation: u64,
}

impl FetchRequest {
    pub fn key(&self) -> PageKey {
        PageKey {
            page: self.page,
            search_term: self.search_term.clone(),
        }
    }
}

/// The host's answer to a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub request: FetchRequest,
    pub items: Vec<SourceItem>,
    pub has_more: bool,
    pub total: Option<usize>,
}

/// An asynchronous, paged provider of options.
///
/// `fetch` must not call back synchronously; the host answers each request
/// exactly once via `SelectPicker::on_fetch_complete`.
pub trait DataSource {
    fn fetch(&mut self, request: &FetchRequest);
}

/// Paging bookkeeping for one sequence (main list or one search term).
#[derive(Debug, Clone)]
pub struct PagingState {
    generation: u64,
    search_term: Option<String>,
    next_page: usize,
    has_more: bool,
    total: Option<usize>,
    in_flight: HashSet<PageKey>,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            generation: 0,
            search_term: None,
            next_page: 0,
            has_more: true,
            total: None,
            in_flight: HashSet::new(),
        }
    }
}

impl PagingState {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    pub const fn total(&self) -> Option<usize> {
        self.total
    }

    pub const fn next_page(&self) -> usize {
        self.next_page
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start over for `search_term` under a new generation.
    ///
    /// Requests still in flight belong to the old generation and will be
    /// discarded when they complete.
    pub fn reset(&mut self, search_term: Option<String>) {
        self.generation += 1;
        self.search_term = search_term;
        self.next_page = 0;
        self.has_more = true;
        self.total = None;
        self.in_flight.clear();
    }

    /// Invalidate everything in flight without losing paging progress.
    pub fn restart(&mut self) {
        self.generation += 1;
        self.in_flight.clear();
    }

    /// Issue the request for the next page, unless there is nothing more or
    /// that page is already in flight.
    pub fn next_request(&mut self, page_size: usize) -> Option<FetchRequest> {
        if !self.has_more {
            return None;
        }
        let request = FetchRequest {
            page: self.next_page,
            page_size,
            search_term: self.search_term.clone(),
            generation: self.generation,
        };
        if !self.in_flight.insert(request.key()) {
            tracing::trace!(
                message = "fetch already in flight",
                page = request.page,
                term = ?request.search_term,
            );
            return None;
        }
        Some(request)
    }

    /// Accept a completed fetch. Returns `false` for stale answers, which
    /// must not be applied.
    pub fn complete(&mut self, response: &FetchResponse) -> bool {
        let request = &response.request;
        if request.generation != self.generation || request.search_term != self.search_term {
            tracing::debug!(
                message = "discarding stale fetch",
                page = request.page,
                request_generation = request.generation,
                current_generation = self.generation,
            );
            return false;
        }
        if !self.in_flight.remove(&request.key()) {
            tracing::debug!(message = "discarding unrequested page", page = request.page);
            return false;
        }
        self.next_page = self.next_page.max(request.page + 1);
        self.has_more = response.has_more;
        if response.total.is_some() {
            self.total = response.total;
        }
        true
    }
}
