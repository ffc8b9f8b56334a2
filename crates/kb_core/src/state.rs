use crate::event::NotificationKind;
use crate::store::{CatalogStore, ProxyStore, SettingsStore, SnippetStore, TaskStore, UrlStore};
use crate::view_model::AppViewModel;

/// Transient user-facing message, drained by the front end once shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) catalog: CatalogStore,
    pub(crate) urls: UrlStore,
    pub(crate) snippets: SnippetStore,
    pub(crate) tasks: TaskStore,
    pub(crate) proxies: ProxyStore,
    pub(crate) settings: SettingsStore,
    notifications: Vec<Notification>,
    /// URLs reported by crawl channels since the last URL reload.
    pub(crate) discovered_urls: usize,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a page size other than the default for both lists.
    pub fn with_page_size(page_size: usize) -> Self {
        let mut state = Self::default();
        state.urls.pagination.set_page_size(page_size);
        state.snippets.pagination.set_page_size(page_size);
        state
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn urls(&self) -> &UrlStore {
        &self.urls
    }

    pub fn snippets(&self) -> &SnippetStore {
        &self.snippets
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn proxies(&self) -> &ProxyStore {
        &self.proxies
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hands pending notifications to the caller and forgets them.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        kb_logging::kb_debug!(
            "notification {:?}: {} - {}",
            notification.kind,
            notification.title,
            notification.message
        );
        self.notifications.push(notification);
    }
}
