//! Per-entity client state containers.
mod catalog;
mod proxies;
mod settings;
mod snippets;
mod tasks;
mod urls;

pub use catalog::CatalogStore;
pub use proxies::ProxyStore;
pub use settings::SettingsStore;
pub use snippets::{SnippetSource, SnippetStore};
pub use tasks::TaskStore;
pub use urls::UrlStore;

/// Lazily loaded detail dialog.
///
/// The full record is only held while the dialog is open; closing it drops
/// the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail<Id, T> {
    Closed,
    Loading(Id),
    Loaded(T),
    Failed { id: Id, message: String },
}

impl<Id, T> Default for Detail<Id, T> {
    fn default() -> Self {
        Detail::Closed
    }
}

impl<Id: PartialEq, T> Detail<Id, T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Detail::Closed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Detail::Loading(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Detail::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a response for `id` is still wanted.
    pub fn awaits(&self, id: &Id) -> bool {
        matches!(self, Detail::Loading(pending) if pending == id)
    }
}
