use uuid::Uuid;

use super::Detail;
use crate::filter;
use crate::model::{DocumentationUrl, UrlStatus};
use crate::pagination::Pagination;
use crate::selection::Selection;

/// Documentation URLs of the active version plus list UI state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlStore {
    urls: Vec<DocumentationUrl>,
    pub loading: bool,
    pub error: Option<String>,
    search: String,
    status_filter: Option<UrlStatus>,
    pub pagination: Pagination,
    selection: Selection<Uuid>,
    pub detail: Detail<Uuid, DocumentationUrl>,
}

impl UrlStore {
    pub fn urls(&self) -> &[DocumentationUrl] {
        &self.urls
    }

    pub fn get(&self, id: Uuid) -> Option<&DocumentationUrl> {
        self.urls.iter().find(|url| url.id == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status_filter(&self) -> Option<UrlStatus> {
        self.status_filter
    }

    pub fn selection(&self) -> &Selection<Uuid> {
        &self.selection
    }

    /// Replaces the collection; list views never keep the large bodies.
    pub fn replace(&mut self, urls: Vec<DocumentationUrl>) {
        self.urls = urls.into_iter().map(DocumentationUrl::without_content).collect();
        self.loading = false;
        self.error = None;
        self.selection
            .retain_loaded(self.urls.iter().map(|url| &url.id));
    }

    /// Clears the collection when the active version changes.
    pub fn reset(&mut self) {
        let page_size = self.pagination.page_size();
        *self = Self::default();
        self.pagination.set_page_size(page_size);
    }

    /// Inserts or replaces a single URL (e.g. after adding one).
    pub fn merge(&mut self, url: DocumentationUrl) {
        let url = url.without_content();
        match self.urls.iter_mut().find(|existing| existing.id == url.id) {
            Some(existing) => *existing = url,
            None => self.urls.push(url),
        }
    }

    /// Applies a pushed status change; unknown ids are ignored.
    pub fn apply_status(&mut self, id: Uuid, status: UrlStatus) -> bool {
        let Some(url) = self.urls.iter_mut().find(|url| url.id == id) else {
            return false;
        };
        url.status = status;
        if let Detail::Loaded(open) = &mut self.detail {
            if open.id == id {
                open.status = status;
            }
        }
        true
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.pagination.reset();
    }

    pub fn set_status_filter(&mut self, status: Option<UrlStatus>) {
        self.status_filter = status;
        self.pagination.reset();
    }

    pub fn filtered(&self) -> Vec<&DocumentationUrl> {
        filter::filter_urls(&self.urls, &self.search, self.status_filter)
    }

    pub fn visible_page(&self) -> Vec<&DocumentationUrl> {
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

    /// Jumps to `page`, clamped to the pages of the filtered collection.
    pub fn set_page(&mut self, page: usize) {
        let count = self.page_count();
        self.pagination.set_page(page.min(count));
    }

    pub fn step_page(&mut self, delta: isize) {
        let len = self.filtered().len();
        self.pagination.step(delta, len);
    }

    /// Flips selection of a loaded URL and returns the new membership.
    ///
    /// Ids outside the loaded collection are ignored and yield `None`.
    pub fn toggle_selected(&mut self, id: Uuid) -> Option<bool> {
        self.get(id)?;
        Some(self.selection.toggle(id))
    }

    pub fn select_page(&mut self) {
        let ids: Vec<Uuid> = self.visible_page().iter().map(|url| url.id).collect();
        self.selection.select_all(ids);
    }

    pub fn select_filtered(&mut self) {
        let ids: Vec<Uuid> = self.filtered().iter().map(|url| url.id).collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_urls(&self) -> Vec<&DocumentationUrl> {
        self.urls
            .iter()
            .filter(|url| self.selection.contains(&url.id))
            .collect()
    }

    pub fn count_by_status(&self, status: UrlStatus) -> usize {
        self.urls.iter().filter(|url| url.status == status).count()
    }
}
