use uuid::Uuid;

use crate::event::BackendEvent;
use crate::form::{AddUrlForm, CrawlForm, SettingsForm, SnippetSearchForm};
use crate::model::{
    CrawlingSettings, DocumentationSnippet, DocumentationUrl, Proxy, Task, TaskId, Technology,
    TechnologyVersion, UrlStatus,
};
use crate::store::SnippetSource;

/// Outcome of a remote call, with failures already turned into a message.
pub type Remote<T> = Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Reload technologies (and the versions of the selected one).
    CatalogRefreshRequested,
    TechnologySelected(Option<Uuid>),
    VersionSelected(Option<Uuid>),
    TechnologySubmitted {
        name: String,
        language: Option<String>,
    },
    TechnologyDeleteRequested(Uuid),
    VersionSubmitted(String),
    VersionDeleteRequested(Uuid),

    /// Reload URLs of the active version.
    UrlsRefreshRequested,
    UrlSearchChanged(String),
    UrlStatusFilterChanged(Option<UrlStatus>),
    UrlPageRequested(usize),
    UrlPageStepped(isize),
    UrlPageSizeChanged(usize),
    UrlToggled(Uuid),
    UrlPageSelected,
    UrlFilteredSelected,
    UrlSelectionCleared,
    UrlDetailOpened(Uuid),
    UrlDetailClosed,
    AddUrlSubmitted(AddUrlForm),
    CrawlFormSubmitted(CrawlForm),
    /// Start one crawl per selected URL.
    CrawlSelectedClicked,
    CleanSelectedClicked,
    GenerateSnippetsClicked,
    StopCrawlingClicked,
    StopAllCrawlingClicked,

    SettingsRefreshRequested,
    SettingsSubmitted(SettingsForm),
    ApplyFiltersClicked,

    SnippetsRefreshRequested,
    SnippetFilterChanged(String),
    SnippetConceptChanged(Option<String>),
    SnippetSourceChanged(SnippetSource),
    SnippetPageRequested(usize),
    SnippetPageStepped(isize),
    SnippetSearchSubmitted(SnippetSearchForm),
    SnippetDetailOpened(Uuid),
    SnippetDetailClosed,

    TasksRefreshRequested,
    CancelTaskClicked(TaskId),

    ProxiesRequested,
    ProxiesRefreshClicked,

    TechnologiesLoaded(Remote<Vec<Technology>>),
    TechnologyCreated(Remote<Technology>),
    TechnologyDeleted {
        technology_id: Uuid,
        result: Remote<bool>,
    },
    VersionsLoaded {
        technology_id: Uuid,
        result: Remote<Vec<TechnologyVersion>>,
    },
    VersionCreated(Remote<TechnologyVersion>),
    VersionDeleted {
        version_id: Uuid,
        result: Remote<bool>,
    },
    UrlsLoaded {
        version_id: Uuid,
        result: Remote<Vec<DocumentationUrl>>,
    },
    UrlAdded(Remote<DocumentationUrl>),
    UrlDetailLoaded {
        url_id: Uuid,
        result: Remote<Option<DocumentationUrl>>,
    },
    SettingsLoaded {
        version_id: Uuid,
        result: Remote<CrawlingSettings>,
    },
    SettingsSaved(Remote<CrawlingSettings>),
    UrlFiltersApplied {
        version_id: Uuid,
        result: Remote<usize>,
    },
    CrawlStarted {
        url: String,
        result: Remote<TaskId>,
    },
    CrawlingStopped(Remote<()>),
    MarkdownCleaned(Remote<Vec<TaskId>>),
    SnippetsGenerated(Remote<Vec<TaskId>>),
    SnippetsLoaded {
        version_id: Uuid,
        result: Remote<Vec<DocumentationSnippet>>,
    },
    SnippetSearchCompleted {
        query: String,
        result: Remote<Vec<DocumentationSnippet>>,
    },
    SnippetDetailLoaded {
        snippet_id: Uuid,
        result: Remote<Option<DocumentationSnippet>>,
    },
    TasksLoaded(Remote<Vec<Task>>),
    TaskCancelled {
        task_id: TaskId,
        result: Remote<()>,
    },
    ProxiesLoaded(Remote<Vec<Proxy>>),
    /// A deduplicated batch from the event channel.
    EventsReceived(Vec<BackendEvent>),
    /// The event channel closed or failed.
    EventStreamClosed(Option<String>),

    /// Render tick.
    Tick,
    NoOp,
}
