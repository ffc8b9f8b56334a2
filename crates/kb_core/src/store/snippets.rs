use std::collections::BTreeSet;

use uuid::Uuid;

use super::Detail;
use crate::filter;
use crate::model::DocumentationSnippet;
use crate::pagination::Pagination;

/// Which collection the snippet list is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetSource {
    #[default]
    Browse,
    SearchResults,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnippetStore {
    browse: Vec<DocumentationSnippet>,
    results: Vec<DocumentationSnippet>,
    pub source: SnippetSource,
    pub loading: bool,
    pub searching: bool,
    pub error: Option<String>,
    /// Query of the last remote vector search.
    pub last_query: Option<String>,
    /// Query of the search in flight; replies for any other query are stale.
    pub pending_query: Option<String>,
    filter_text: String,
    concept: Option<String>,
    pub pagination: Pagination,
    pub detail: Detail<Uuid, DocumentationSnippet>,
}

impl SnippetStore {
    pub fn replace_browse(&mut self, snippets: Vec<DocumentationSnippet>) {
        self.browse = snippets;
        self.loading = false;
        self.error = None;
        self.source = SnippetSource::Browse;
        self.pagination.reset();
    }

    pub fn replace_results(&mut self, query: String, snippets: Vec<DocumentationSnippet>) {
        self.results = snippets;
        self.searching = false;
        self.error = None;
        self.last_query = Some(query);
        self.source = SnippetSource::SearchResults;
        self.pagination.reset();
    }

    pub fn reset(&mut self) {
        let page_size = self.pagination.page_size();
        *self = Self::default();
        self.pagination.set_page_size(page_size);
    }

    pub fn active(&self) -> &[DocumentationSnippet] {
        match self.source {
            SnippetSource::Browse => &self.browse,
            SnippetSource::SearchResults => &self.results,
        }
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn concept(&self) -> Option<&str> {
        self.concept.as_deref()
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.pagination.reset();
    }

    pub fn set_concept(&mut self, concept: Option<String>) {
        self.concept = concept.filter(|c| !c.trim().is_empty());
        self.pagination.reset();
    }

    pub fn show(&mut self, source: SnippetSource) {
        self.source = source;
        self.pagination.reset();
    }

    pub fn filtered(&self) -> Vec<&DocumentationSnippet> {
        filter::filter_snippets(self.active(), &self.filter_text, self.concept())
    }

    pub fn visible_page(&self) -> Vec<&DocumentationSnippet> {
        let filtered = self.filtered();
        let range = self.pagination.page_range(filtered.len());
        filtered[range].to_vec()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered().len())
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page(self.filtered().len())
    }

    pub fn set_page(&mut self, page: usize) {
        let count = self.page_count();
        self.pagination.set_page(page.min(count));
    }

    pub fn step_page(&mut self, delta: isize) {
        let len = self.filtered().len();
        self.pagination.step(delta, len);
    }

    /// Distinct concept tags of the active collection, sorted case-insensitively.
    pub fn concepts(&self) -> Vec<String> {
        let unique: BTreeSet<String> = self
            .active()
            .iter()
            .flat_map(|snippet| snippet.concepts.iter())
            .map(|tag| tag.to_lowercase())
            .collect();
        unique.into_iter().collect()
    }
}
