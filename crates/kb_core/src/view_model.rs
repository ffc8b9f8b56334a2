use uuid::Uuid;

use crate::model::{BadgeTone, StageStatus, TaskId, TaskStatus, UrlStatus};
use crate::preview::{best_body, prepare_preview_content, PreviewSource};
use crate::state::{AppState, Notification};
use crate::store::{Detail, SnippetSource};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub technologies: Vec<CatalogRowView>,
    pub versions: Vec<CatalogRowView>,
    pub selected_technology: Option<String>,
    pub selected_version: Option<String>,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,
    pub urls: UrlListView,
    pub url_detail: Option<DetailView<UrlDetailView>>,
    pub snippets: SnippetListView,
    pub snippet_detail: Option<DetailView<SnippetDetailView>>,
    pub tasks: Vec<TaskRowView>,
    pub tasks_loading: bool,
    pub proxies: Vec<ProxyRowView>,
    pub settings: Option<SettingsView>,
    pub notifications: Vec<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRowView {
    pub id: Uuid,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlListView {
    pub rows: Vec<UrlRowView>,
    pub page: usize,
    pub page_count: usize,
    /// Rows matching the search and status filter.
    pub filtered_total: usize,
    pub total: usize,
    pub selected_count: usize,
    pub search: String,
    pub status_filter: Option<UrlStatus>,
    pub discovered: usize,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRowView {
    pub id: Uuid,
    pub url: String,
    pub status: UrlStatus,
    pub badge: &'static str,
    pub tone: BadgeTone,
    pub selected: bool,
    pub processed: bool,
}

/// State of a detail dialog as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlDetailView {
    pub id: Uuid,
    pub url: String,
    pub status: UrlStatus,
    pub source: Option<PreviewSource>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnippetListView {
    pub rows: Vec<SnippetRowView>,
    pub source: SnippetSource,
    pub last_query: Option<String>,
    pub filter_text: String,
    pub concept: Option<String>,
    pub concepts: Vec<String>,
    pub page: usize,
    pub page_count: usize,
    pub filtered_total: usize,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRowView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub source_url: String,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDetailView {
    pub id: Uuid,
    pub title: String,
    pub source_url: String,
    pub concepts: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRowView {
    pub id: TaskId,
    pub task_type: String,
    pub status: TaskStatus,
    /// Whole percent, 0..=100.
    pub progress: u8,
    pub url: Option<String>,
    pub stages: Vec<StageView>,
    pub cancel_requested: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageView {
    pub name: String,
    pub progress: u8,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRowView {
    pub url: String,
    pub last_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub prefix_path: String,
    pub anti_paths: Vec<String>,
    pub anti_keywords: Vec<String>,
    pub skip_processed: bool,
    pub saving: bool,
    pub last_skipped: Option<usize>,
}

fn percent(progress: f32) -> u8 {
    progress.clamp(0.0, 100.0).round() as u8
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let catalog = state.catalog();
        let technologies = catalog
            .technologies()
            .iter()
            .map(|tech| CatalogRowView {
                id: tech.id,
                label: match &tech.language {
                    Some(language) => format!("{} ({language})", tech.name),
                    None => tech.name.clone(),
                },
                selected: catalog.selected_technology() == Some(tech.id),
            })
            .collect();
        let versions = catalog
            .versions()
            .iter()
            .map(|version| CatalogRowView {
                id: version.id,
                label: version.version.clone(),
                selected: catalog.selected_version() == Some(version.id),
            })
            .collect();

        let settings = state.settings();
        Self {
            technologies,
            versions,
            selected_technology: catalog
                .selected_technology()
                .and_then(|id| catalog.technology(id))
                .map(|tech| tech.name.clone()),
            selected_version: catalog
                .selected_version()
                .and_then(|id| catalog.version(id))
                .map(|version| version.version.clone()),
            catalog_loading: catalog.loading,
            catalog_error: catalog.error.clone(),
            urls: url_list(state),
            url_detail: url_detail(&state.urls().detail),
            snippets: snippet_list(state),
            snippet_detail: snippet_detail(&state.snippets().detail),
            tasks: task_rows(state),
            tasks_loading: state.tasks().loading,
            proxies: state
                .proxies()
                .proxies()
                .iter()
                .map(|proxy| ProxyRowView {
                    url: proxy.url.clone(),
                    last_used: proxy
                        .last_used
                        .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
                })
                .collect(),
            settings: settings.settings().map(|current| SettingsView {
                prefix_path: current.prefix_path.clone(),
                anti_paths: current.anti_paths.clone(),
                anti_keywords: current.anti_keywords.clone(),
                skip_processed: current.skip_processed,
                saving: settings.saving,
                last_skipped: settings.last_skipped,
            }),
            notifications: state.notifications().to_vec(),
            dirty: state.is_dirty(),
        }
    }
}

fn url_list(state: &AppState) -> UrlListView {
    let store = state.urls();
    let selection = store.selection();
    let rows = store
        .visible_page()
        .into_iter()
        .map(|url| UrlRowView {
            id: url.id,
            url: url.url.clone(),
            status: url.status,
            badge: url.status.badge_label(),
            tone: url.status.badge_tone(),
            selected: selection.contains(&url.id),
            processed: url.is_processed,
        })
        .collect();
    UrlListView {
        rows,
        page: store.current_page(),
        page_count: store.page_count(),
        filtered_total: store.filtered().len(),
        total: store.urls().len(),
        selected_count: selection.len(),
        search: store.search().to_string(),
        status_filter: store.status_filter(),
        discovered: state.discovered_urls,
        loading: store.loading,
        error: store.error.clone(),
    }
}

fn url_detail(detail: &Detail<Uuid, crate::model::DocumentationUrl>) -> Option<DetailView<UrlDetailView>> {
    match detail {
        Detail::Closed => None,
        Detail::Loading(_) => Some(DetailView::Loading),
        Detail::Failed { message, .. } => Some(DetailView::Failed(message.clone())),
        Detail::Loaded(url) => {
            let body = best_body(url);
            Some(DetailView::Loaded(UrlDetailView {
                id: url.id,
                url: url.url.clone(),
                status: url.status,
                source: body.map(|(source, _)| source),
                body: body.map(|(_, text)| prepare_preview_content(text)),
            }))
        }
    }
}

fn snippet_list(state: &AppState) -> SnippetListView {
    let store = state.snippets();
    let rows = store
        .visible_page()
        .into_iter()
        .map(|snippet| SnippetRowView {
            id: snippet.id,
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            source_url: snippet.source_url.clone(),
            concepts: snippet.concepts.clone(),
        })
        .collect();
    SnippetListView {
        rows,
        source: store.source,
        last_query: store.last_query.clone(),
        filter_text: store.filter_text().to_string(),
        concept: store.concept().map(str::to_string),
        concepts: store.concepts(),
        page: store.current_page(),
        page_count: store.page_count(),
        filtered_total: store.filtered().len(),
        loading: store.loading || store.searching,
        error: store.error.clone(),
    }
}

fn snippet_detail(
    detail: &Detail<Uuid, crate::model::DocumentationSnippet>,
) -> Option<DetailView<SnippetDetailView>> {
    match detail {
        Detail::Closed => None,
        Detail::Loading(_) => Some(DetailView::Loading),
        Detail::Failed { message, .. } => Some(DetailView::Failed(message.clone())),
        Detail::Loaded(snippet) => Some(DetailView::Loaded(SnippetDetailView {
            id: snippet.id,
            title: snippet.title.clone(),
            source_url: snippet.source_url.clone(),
            concepts: snippet.concepts.clone(),
            content: prepare_preview_content(&snippet.content),
        })),
    }
}

fn task_rows(state: &AppState) -> Vec<TaskRowView> {
    let store = state.tasks();
    store
        .all()
        .into_iter()
        .map(|task| TaskRowView {
            id: task.id.clone(),
            task_type: task.task_type.clone(),
            status: task.status,
            progress: percent(task.progress),
            url: task.payload_url().map(str::to_string),
            stages: task
                .stages
                .iter()
                .map(|stage| StageView {
                    name: stage.name.clone(),
                    progress: percent(stage.progress),
                    status: stage.status,
                })
                .collect(),
            cancel_requested: store.is_cancel_requested(&task.id),
            error: task.error.clone(),
        })
        .collect()
}
