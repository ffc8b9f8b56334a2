//! Knowledge-base client core: entity models, pure state machine and view-model helpers.
pub mod aggregate;
mod effect;
pub mod event;
pub mod filter;
pub mod form;
pub mod model;
mod msg;
pub mod pagination;
pub mod preview;
pub mod selection;
mod state;
pub mod store;
mod update;
mod view_model;

pub use aggregate::{dedupe_events, dedupe_latest, derive_task_progress, process_tasks, EventKey};
pub use effect::Effect;
pub use event::{BackendEvent, CrawlEvent, JobEvent, NotificationKind};
pub use msg::{Msg, Remote};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use selection::Selection;
pub use state::{AppState, Notification};
pub use update::update;
pub use view_model::{
    AppViewModel, CatalogRowView, DetailView, ProxyRowView, SettingsView, SnippetDetailView,
    SnippetListView, SnippetRowView, StageView, TaskRowView, UrlDetailView, UrlListView,
    UrlRowView,
};
