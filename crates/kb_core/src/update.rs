use kb_logging::{kb_debug, kb_warn};
use uuid::Uuid;

use crate::event::{BackendEvent, CrawlEvent, JobEvent, NotificationKind};
use crate::form::{FormError, StartCrawlRequest};
use crate::model::UrlStatus;
use crate::state::{AppState, Notification};
use crate::store::Detail;
use crate::{Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if matches!(msg, Msg::Tick | Msg::NoOp) {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::CatalogRefreshRequested => {
            state.catalog.loading = true;
            let mut effects = vec![Effect::LoadTechnologies];
            if let Some(technology_id) = state.catalog.selected_technology() {
                effects.push(Effect::LoadVersions { technology_id });
            }
            effects
        }
        Msg::TechnologySelected(id) => {
            if !state.catalog.select_technology(id) {
                return (state, Vec::new());
            }
            clear_version_scope(&mut state);
            match id {
                Some(technology_id) => {
                    state.catalog.loading = true;
                    vec![Effect::LoadVersions { technology_id }]
                }
                None => Vec::new(),
            }
        }
        Msg::VersionSelected(id) => {
            if !state.catalog.select_version(id) {
                return (state, Vec::new());
            }
            clear_version_scope(&mut state);
            match id {
                Some(version_id) => load_version_scope(&mut state, version_id),
                None => Vec::new(),
            }
        }
        Msg::TechnologySubmitted { name, language } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                reject(&mut state, "Create technology", FormError::Required { field: "name" });
                Vec::new()
            } else {
                let language = language
                    .map(|lang| lang.trim().to_string())
                    .filter(|lang| !lang.is_empty());
                vec![Effect::CreateTechnology { name, language }]
            }
        }
        Msg::TechnologyDeleteRequested(technology_id) => {
            vec![Effect::DeleteTechnology { technology_id }]
        }
        Msg::VersionSubmitted(version) => {
            let version = version.trim().to_string();
            match state.catalog.selected_technology() {
                None => {
                    reject(&mut state, "Create version", FormError::NoVersionSelected);
                    Vec::new()
                }
                Some(_) if version.is_empty() => {
                    reject(&mut state, "Create version", FormError::Required { field: "version" });
                    Vec::new()
                }
                Some(technology_id) => vec![Effect::CreateVersion {
                    technology_id,
                    version,
                }],
            }
        }
        Msg::VersionDeleteRequested(version_id) => vec![Effect::DeleteVersion { version_id }],

        Msg::UrlsRefreshRequested => match require_version(&mut state, "Load URLs") {
            Some(version_id) => {
                state.urls.loading = true;
                vec![Effect::LoadUrls { version_id }]
            }
            None => Vec::new(),
        },
        Msg::UrlSearchChanged(query) => {
            state.urls.set_search(query);
            Vec::new()
        }
        Msg::UrlStatusFilterChanged(status) => {
            state.urls.set_status_filter(status);
            Vec::new()
        }
        Msg::UrlPageRequested(page) => {
            state.urls.set_page(page);
            Vec::new()
        }
        Msg::UrlPageStepped(delta) => {
            state.urls.step_page(delta);
            Vec::new()
        }
        Msg::UrlPageSizeChanged(size) => {
            state.urls.pagination.set_page_size(size);
            state.snippets.pagination.set_page_size(size);
            Vec::new()
        }
        Msg::UrlToggled(id) => {
            if state.urls.toggle_selected(id).is_none() {
                kb_debug!("ignoring selection toggle for unknown url {}", id);
                return (state, Vec::new());
            }
            Vec::new()
        }
        Msg::UrlPageSelected => {
            state.urls.select_page();
            Vec::new()
        }
        Msg::UrlFilteredSelected => {
            state.urls.select_filtered();
            Vec::new()
        }
        Msg::UrlSelectionCleared => {
            state.urls.clear_selection();
            Vec::new()
        }
        Msg::UrlDetailOpened(url_id) => {
            state.urls.detail = Detail::Loading(url_id);
            vec![Effect::LoadUrlDetail { url_id }]
        }
        Msg::UrlDetailClosed => {
            state.urls.detail = Detail::Closed;
            Vec::new()
        }
        Msg::AddUrlSubmitted(form) => {
            match form.to_request(
                state.catalog.selected_technology(),
                state.catalog.selected_version(),
            ) {
                Ok(request) => vec![Effect::AddUrl(request)],
                Err(err) => {
                    reject(&mut state, "Add URL", err);
                    Vec::new()
                }
            }
        }
        Msg::CrawlFormSubmitted(form) => {
            match form.to_request(
                state.catalog.selected_technology(),
                state.catalog.selected_version(),
            ) {
                Ok(request) => vec![Effect::StartCrawl(request)],
                Err(err) => {
                    reject(&mut state, "Start crawl", err);
                    Vec::new()
                }
            }
        }
        Msg::CrawlSelectedClicked => crawl_selected(&mut state),
        Msg::CleanSelectedClicked => match selected_ids(&mut state, "Clean markdown") {
            Some(url_ids) => vec![Effect::CleanMarkdown { url_ids }],
            None => Vec::new(),
        },
        Msg::GenerateSnippetsClicked => match selected_ids(&mut state, "Generate snippets") {
            Some(url_ids) => vec![Effect::GenerateSnippets { url_ids }],
            None => Vec::new(),
        },
        Msg::StopCrawlingClicked => {
            match (
                state.catalog.selected_technology(),
                state.catalog.selected_version(),
            ) {
                (Some(technology_id), Some(version_id)) => vec![Effect::StopCrawling {
                    technology_id,
                    version_id,
                }],
                _ => {
                    reject(&mut state, "Stop crawling", FormError::NoVersionSelected);
                    Vec::new()
                }
            }
        }
        Msg::StopAllCrawlingClicked => vec![Effect::StopAllCrawling],

        Msg::SettingsRefreshRequested => match require_version(&mut state, "Load settings") {
            Some(version_id) => {
                state.settings.loading = true;
                vec![Effect::LoadSettings { version_id }]
            }
            None => Vec::new(),
        },
        Msg::SettingsSubmitted(form) => match form.to_request(state.catalog.selected_version()) {
            Ok(request) => {
                state.settings.saving = true;
                vec![Effect::SaveSettings(request)]
            }
            Err(err) => {
                reject(&mut state, "Save settings", err);
                Vec::new()
            }
        },
        Msg::ApplyFiltersClicked => match require_version(&mut state, "Apply filters") {
            Some(version_id) => vec![Effect::ApplyUrlFilters { version_id }],
            None => Vec::new(),
        },

        Msg::SnippetsRefreshRequested => match require_version(&mut state, "Load snippets") {
            Some(version_id) => {
                state.snippets.loading = true;
                vec![Effect::LoadSnippets { version_id }]
            }
            None => Vec::new(),
        },
        Msg::SnippetFilterChanged(text) => {
            state.snippets.set_filter_text(text);
            Vec::new()
        }
        Msg::SnippetConceptChanged(concept) => {
            state.snippets.set_concept(concept);
            Vec::new()
        }
        Msg::SnippetSourceChanged(source) => {
            state.snippets.show(source);
            Vec::new()
        }
        Msg::SnippetPageRequested(page) => {
            state.snippets.set_page(page);
            Vec::new()
        }
        Msg::SnippetPageStepped(delta) => {
            state.snippets.step_page(delta);
            Vec::new()
        }
        Msg::SnippetSearchSubmitted(form) => {
            match form.to_request(
                state.catalog.selected_technology(),
                state.catalog.selected_version(),
            ) {
                Ok(request) => {
                    state.snippets.searching = true;
                    state.snippets.pending_query = Some(request.query.clone());
                    vec![Effect::SearchSnippets(request)]
                }
                Err(err) => {
                    reject(&mut state, "Search snippets", err);
                    Vec::new()
                }
            }
        }
        Msg::SnippetDetailOpened(snippet_id) => {
            state.snippets.detail = Detail::Loading(snippet_id);
            vec![Effect::LoadSnippetDetail { snippet_id }]
        }
        Msg::SnippetDetailClosed => {
            state.snippets.detail = Detail::Closed;
            Vec::new()
        }

        Msg::TasksRefreshRequested => {
            state.tasks.loading = true;
            vec![Effect::LoadTasks]
        }
        Msg::CancelTaskClicked(task_id) => {
            if state.tasks.is_cancel_requested(&task_id) {
                return (state, Vec::new());
            }
            match state.tasks.get(&task_id) {
                Some(task) if task.status.is_finished() => {
                    let message = format!("Task {} is already {}", task_id, task.status.label());
                    state.notify(Notification::info("Cancel task", message));
                    Vec::new()
                }
                _ => {
                    state.tasks.mark_cancel_requested(&task_id);
                    vec![Effect::CancelTask { task_id }]
                }
            }
        }

        Msg::ProxiesRequested => {
            state.proxies.loading = true;
            vec![Effect::LoadProxies]
        }
        Msg::ProxiesRefreshClicked => {
            state.proxies.loading = true;
            vec![Effect::RefreshProxies]
        }

        Msg::TechnologiesLoaded(result) => {
            match result {
                Ok(technologies) => state.catalog.replace_technologies(technologies),
                Err(message) => {
                    state.catalog.loading = false;
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load technologies", message));
                }
            }
            Vec::new()
        }
        Msg::TechnologyCreated(result) => {
            match result {
                Ok(technology) => {
                    let message = format!("Added {}", technology.name);
                    state.catalog.merge_technology(technology);
                    state.notify(Notification::success("Technology created", message));
                }
                Err(message) => {
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to create technology", message));
                }
            }
            Vec::new()
        }
        Msg::TechnologyDeleted {
            technology_id,
            result,
        } => {
            match result {
                Ok(true) => {
                    let was_selected = state.catalog.selected_technology() == Some(technology_id);
                    state.catalog.remove_technology(technology_id);
                    if was_selected {
                        clear_version_scope(&mut state);
                    }
                    state.notify(Notification::success("Technology deleted", technology_id.to_string()));
                }
                Ok(false) => state.notify(Notification::error(
                    "Failed to delete technology",
                    format!("Technology {technology_id} was not found"),
                )),
                Err(message) => {
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to delete technology", message));
                }
            }
            Vec::new()
        }
        Msg::VersionsLoaded {
            technology_id,
            result,
        } => {
            match result {
                Ok(versions) => {
                    if !state.catalog.replace_versions(technology_id, versions) {
                        kb_debug!("dropping stale versions of technology {}", technology_id);
                        return (state, Vec::new());
                    }
                }
                Err(message) => {
                    state.catalog.loading = false;
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load versions", message));
                }
            }
            Vec::new()
        }
        Msg::VersionCreated(result) => {
            match result {
                Ok(version) => {
                    let message = format!("Added version {}", version.version);
                    state.catalog.merge_version(version);
                    state.notify(Notification::success("Version created", message));
                }
                Err(message) => {
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to create version", message));
                }
            }
            Vec::new()
        }
        Msg::VersionDeleted { version_id, result } => {
            match result {
                Ok(true) => {
                    let was_selected = state.catalog.selected_version() == Some(version_id);
                    state.catalog.remove_version(version_id);
                    if was_selected {
                        clear_version_scope(&mut state);
                    }
                    state.notify(Notification::success("Version deleted", version_id.to_string()));
                }
                Ok(false) => state.notify(Notification::error(
                    "Failed to delete version",
                    format!("Version {version_id} was not found"),
                )),
                Err(message) => {
                    state.catalog.error = Some(message.clone());
                    state.notify(Notification::error("Failed to delete version", message));
                }
            }
            Vec::new()
        }
        Msg::UrlsLoaded { version_id, result } => {
            if !is_active_version(&state, version_id) {
                kb_debug!("dropping stale urls of version {}", version_id);
                return (state, Vec::new());
            }
            match result {
                Ok(urls) => {
                    state.urls.replace(urls);
                    state.discovered_urls = 0;
                }
                Err(message) => {
                    state.urls.loading = false;
                    state.urls.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load URLs", message));
                }
            }
            Vec::new()
        }
        Msg::UrlAdded(result) => {
            match result {
                Ok(url) => {
                    let message = url.url.clone();
                    if is_active_version(&state, url.version_id) {
                        state.urls.merge(url);
                    }
                    state.notify(Notification::success("URL added", message));
                }
                Err(message) => {
                    state.urls.error = Some(message.clone());
                    state.notify(Notification::error("Failed to add URL", message));
                }
            }
            Vec::new()
        }
        Msg::UrlDetailLoaded { url_id, result } => {
            if !state.urls.detail.awaits(&url_id) {
                // Closed or replaced while loading; the body is not kept.
                return (state, Vec::new());
            }
            state.urls.detail = match result {
                Ok(Some(url)) => Detail::Loaded(url),
                Ok(None) => Detail::Failed {
                    id: url_id,
                    message: "URL not found".to_string(),
                },
                Err(message) => {
                    state.notify(Notification::error("Failed to load URL", message.clone()));
                    Detail::Failed {
                        id: url_id,
                        message,
                    }
                }
            };
            Vec::new()
        }
        Msg::SettingsLoaded { version_id, result } => {
            if !is_active_version(&state, version_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(settings) => state.settings.replace(settings),
                Err(message) => {
                    state.settings.loading = false;
                    state.settings.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load crawl settings", message));
                }
            }
            Vec::new()
        }
        Msg::SettingsSaved(result) => {
            match result {
                Ok(settings) => {
                    // A save that lands after a version switch belongs to the old version.
                    if is_active_version(&state, settings.version_id) {
                        state.settings.replace(settings);
                    }
                    state.notify(Notification::success("Settings saved", "Crawl settings updated"));
                }
                Err(message) => {
                    state.settings.saving = false;
                    state.settings.error = Some(message.clone());
                    state.notify(Notification::error("Failed to save settings", message));
                }
            }
            Vec::new()
        }
        Msg::UrlFiltersApplied { version_id, result } => match result {
            Ok(skipped) => {
                state.settings.last_skipped = Some(skipped);
                let message = if skipped > 0 {
                    format!("Marked {skipped} URLs as skipped")
                } else {
                    "No URLs were skipped".to_string()
                };
                state.notify(Notification::info("URL filters applied", message));
                if skipped > 0 && is_active_version(&state, version_id) {
                    state.urls.loading = true;
                    vec![Effect::LoadUrls { version_id }]
                } else {
                    Vec::new()
                }
            }
            Err(message) => {
                state.settings.error = Some(message.clone());
                state.notify(Notification::error("Failed to apply URL filters", message));
                Vec::new()
            }
        },
        Msg::CrawlStarted { url, result } => {
            match result {
                Ok(task_id) => {
                    state.tasks.on_crawl_event(&CrawlEvent::Started {
                        task_id: task_id.clone(),
                        url: url.clone(),
                    });
                    let known = state
                        .urls
                        .urls()
                        .iter()
                        .find(|known| known.url == url)
                        .map(|known| known.id);
                    if let Some(id) = known {
                        state.urls.apply_status(id, UrlStatus::Crawling);
                    }
                    state.notify(Notification::info(
                        "Crawl started",
                        format!("{url} (task {task_id})"),
                    ));
                }
                Err(message) => {
                    kb_warn!("start_crawling failed for {}: {}", url, message);
                    state.notify(Notification::error(
                        "Failed to start crawling",
                        format!("{url}: {message}"),
                    ));
                }
            }
            Vec::new()
        }
        Msg::CrawlingStopped(result) => {
            match result {
                Ok(()) => state.notify(Notification::info("Crawling stopped", "Stop requested")),
                Err(message) => {
                    state.notify(Notification::error("Failed to stop crawling", message))
                }
            }
            Vec::new()
        }
        Msg::MarkdownCleaned(result) => match result {
            Ok(task_ids) => {
                state.notify(Notification::success(
                    "Markdown cleaned",
                    format!("{} URLs cleaned", task_ids.len()),
                ));
                reload_urls(&mut state)
            }
            Err(message) => {
                state.urls.error = Some(message.clone());
                state.notify(Notification::error("Failed to clean markdown", message));
                Vec::new()
            }
        },
        Msg::SnippetsGenerated(result) => match result {
            Ok(task_ids) => {
                state.notify(Notification::success(
                    "Snippets generated",
                    format!("{} URLs processed", task_ids.len()),
                ));
                let mut effects = reload_urls(&mut state);
                effects.extend(reload_snippets(&mut state));
                effects
            }
            Err(message) => {
                state.snippets.error = Some(message.clone());
                state.notify(Notification::error("Failed to generate snippets", message));
                Vec::new()
            }
        },
        Msg::SnippetsLoaded { version_id, result } => {
            if !is_active_version(&state, version_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(snippets) => state.snippets.replace_browse(snippets),
                Err(message) => {
                    state.snippets.loading = false;
                    state.snippets.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load snippets", message));
                }
            }
            Vec::new()
        }
        Msg::SnippetSearchCompleted { query, result } => {
            if state.snippets.pending_query.as_deref() != Some(query.as_str()) {
                return (state, Vec::new());
            }
            state.snippets.pending_query = None;
            match result {
                Ok(snippets) => state.snippets.replace_results(query, snippets),
                Err(message) => {
                    state.snippets.searching = false;
                    state.snippets.error = Some(message.clone());
                    state.notify(Notification::error("Search failed", message));
                }
            }
            Vec::new()
        }
        Msg::SnippetDetailLoaded { snippet_id, result } => {
            if !state.snippets.detail.awaits(&snippet_id) {
                return (state, Vec::new());
            }
            state.snippets.detail = match result {
                Ok(Some(snippet)) => Detail::Loaded(snippet),
                Ok(None) => Detail::Failed {
                    id: snippet_id,
                    message: "Snippet not found".to_string(),
                },
                Err(message) => {
                    state.notify(Notification::error("Failed to load snippet", message.clone()));
                    Detail::Failed {
                        id: snippet_id,
                        message,
                    }
                }
            };
            Vec::new()
        }
        Msg::TasksLoaded(result) => {
            match result {
                Ok(tasks) => state.tasks.replace(tasks),
                Err(message) => {
                    state.tasks.loading = false;
                    state.tasks.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load tasks", message));
                }
            }
            Vec::new()
        }
        Msg::TaskCancelled { task_id, result } => {
            match result {
                Ok(()) => {
                    state.tasks.on_cancelled(&task_id);
                    state.notify(Notification::info("Task cancelled", task_id));
                }
                Err(message) => {
                    state.tasks.clear_cancel_requested(&task_id);
                    state.notify(Notification::error(
                        "Failed to cancel task",
                        format!("{task_id}: {message}"),
                    ));
                }
            }
            Vec::new()
        }
        Msg::ProxiesLoaded(result) => {
            match result {
                Ok(proxies) => state.proxies.replace(proxies),
                Err(message) => {
                    state.proxies.loading = false;
                    state.proxies.error = Some(message.clone());
                    state.notify(Notification::error("Failed to load proxies", message));
                }
            }
            Vec::new()
        }
        Msg::EventsReceived(events) => {
            if events.is_empty() {
                return (state, Vec::new());
            }
            apply_events(&mut state, events)
        }
        Msg::EventStreamClosed(reason) => {
            let message = reason.unwrap_or_else(|| "Event channel closed".to_string());
            state.notify(Notification::new(NotificationKind::Warning, "Live updates stopped", message));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    state.mark_dirty();
    (state, effects)
}

fn reject(state: &mut AppState, title: &str, err: FormError) {
    state.notify(Notification::error(title, err.to_string()));
}

fn require_version(state: &mut AppState, title: &str) -> Option<Uuid> {
    let version = state.catalog.selected_version();
    if version.is_none() {
        reject(state, title, FormError::NoVersionSelected);
    }
    version
}

fn is_active_version(state: &AppState, version_id: Uuid) -> bool {
    state.catalog.selected_version() == Some(version_id)
}

fn selected_ids(state: &mut AppState, title: &str) -> Option<Vec<Uuid>> {
    let ids = state.urls.selection().ids();
    if ids.is_empty() {
        state.notify(Notification::error(title, "No URLs selected"));
        return None;
    }
    Some(ids)
}

/// Everything scoped to a version is dropped when the selection changes.
fn clear_version_scope(state: &mut AppState) {
    state.urls.reset();
    state.snippets.reset();
    state.settings.reset();
    state.discovered_urls = 0;
}

fn load_version_scope(state: &mut AppState, version_id: Uuid) -> Vec<Effect> {
    state.urls.loading = true;
    state.settings.loading = true;
    state.snippets.loading = true;
    vec![
        Effect::LoadUrls { version_id },
        Effect::LoadSettings { version_id },
        Effect::LoadSnippets { version_id },
    ]
}

fn reload_urls(state: &mut AppState) -> Vec<Effect> {
    match state.catalog.selected_version() {
        Some(version_id) => {
            state.urls.loading = true;
            vec![Effect::LoadUrls { version_id }]
        }
        None => Vec::new(),
    }
}

fn reload_snippets(state: &mut AppState) -> Vec<Effect> {
    match state.catalog.selected_version() {
        Some(version_id) => {
            state.snippets.loading = true;
            vec![Effect::LoadSnippets { version_id }]
        }
        None => Vec::new(),
    }
}

/// One crawl per selected URL, each reported on its own.
fn crawl_selected(state: &mut AppState) -> Vec<Effect> {
    let (Some(technology_id), Some(version_id)) = (
        state.catalog.selected_technology(),
        state.catalog.selected_version(),
    ) else {
        reject(state, "Start crawl", FormError::NoVersionSelected);
        return Vec::new();
    };
    let settings = state.settings.effective(version_id);
    let requests: Vec<StartCrawlRequest> = state
        .urls
        .selected_urls()
        .into_iter()
        .map(|url| StartCrawlRequest::for_known_url(technology_id, &url.url, &settings))
        .collect();
    if requests.is_empty() {
        state.notify(Notification::error("Start crawl", "No URLs selected"));
        return Vec::new();
    }
    requests.into_iter().map(Effect::StartCrawl).collect()
}

#[derive(Default)]
struct Reloads {
    urls: bool,
    snippets: bool,
}

fn apply_events(state: &mut AppState, events: Vec<BackendEvent>) -> Vec<Effect> {
    let mut reloads = Reloads::default();
    for event in events {
        apply_event(state, event, &mut reloads);
    }

    let mut effects = Vec::new();
    if reloads.urls {
        effects.extend(reload_urls(state));
    }
    if reloads.snippets {
        effects.extend(reload_snippets(state));
    }
    effects
}

fn apply_event(state: &mut AppState, event: BackendEvent, reloads: &mut Reloads) {
    match event {
        BackendEvent::TaskCreated {
            task_id,
            task_type,
            metadata,
        } => state.tasks.on_created(&task_id, &task_type, &metadata),
        BackendEvent::TaskUpdated {
            task_id,
            progress,
            status,
            stages,
        } => state.tasks.on_updated(&task_id, progress, &status, stages),
        BackendEvent::TaskCompleted { task_id, result } => {
            state.tasks.on_completed(&task_id);
            if let Some(count) = result.snippets_count {
                reloads.snippets = true;
                state.notify(Notification::success(
                    "Task completed",
                    format!("Task {task_id} produced {count} snippets"),
                ));
            }
        }
        BackendEvent::TaskFailed { task_id, error } => {
            state.tasks.on_failed(&task_id, &error);
            state.notify(Notification::error("Task failed", format!("{task_id}: {error}")));
        }
        BackendEvent::TaskCancelled { task_id } => state.tasks.on_cancelled(&task_id),
        BackendEvent::ProcessingStarted { task_id, url, .. } => {
            state.tasks.on_processing_started(&task_id, url.as_deref())
        }
        BackendEvent::ProcessingProgress {
            task_id,
            stage,
            progress,
        } => state.tasks.on_stage_progress(&task_id, &stage, progress),
        BackendEvent::ProcessingCompleted {
            task_id,
            snippets_count,
        } => {
            state.tasks.on_completed(&task_id);
            reloads.snippets = true;
            state.notify(Notification::success(
                "Processing completed",
                format!("Task {task_id} produced {snippets_count} snippets"),
            ));
        }
        BackendEvent::UrlStatusUpdated { url_id, status } => {
            if !state.urls.apply_status(url_id, UrlStatus::from(status)) {
                kb_debug!("status update for url {} outside the loaded list", url_id);
            }
        }
        BackendEvent::AppNotification {
            title,
            message,
            notification_type,
        } => state.notify(Notification::new(
            notification_type.unwrap_or_default(),
            title,
            message,
        )),
        BackendEvent::Crawl(event) => {
            state.tasks.on_crawl_event(&event);
            match event {
                CrawlEvent::UrlDiscovered { .. } => state.discovered_urls += 1,
                CrawlEvent::Finished {
                    task_id,
                    total_urls,
                } => {
                    reloads.urls = true;
                    state.notify(Notification::success(
                        "Crawl finished",
                        format!("Task {task_id} found {total_urls} URLs"),
                    ));
                }
                CrawlEvent::Error { message, .. } => {
                    state.notify(Notification::error("Crawl error", message))
                }
                CrawlEvent::Started { .. } | CrawlEvent::Progress { .. } => {}
            }
        }
        BackendEvent::Markdown(event) => apply_job_event(state, "Markdown cleaning", event, reloads, false),
        BackendEvent::Snippets(event) => apply_job_event(state, "Snippet generation", event, reloads, true),
    }
}

fn apply_job_event(
    state: &mut AppState,
    title: &str,
    event: JobEvent,
    reloads: &mut Reloads,
    produces_snippets: bool,
) {
    match event {
        JobEvent::Started { url_count } => {
            kb_debug!("{} started for {} urls", title, url_count);
        }
        JobEvent::Progress {
            current,
            total,
            url,
        } => {
            kb_debug!("{} {}/{}: {}", title, current + 1, total, url);
        }
        JobEvent::Finished { task_ids } => {
            reloads.urls = true;
            reloads.snippets |= produces_snippets;
            state.notify(Notification::success(
                format!("{title} finished"),
                format!("{} URLs done", task_ids.len()),
            ));
        }
        JobEvent::Error { message } => {
            state.notify(Notification::error(format!("{title} error"), message));
        }
    }
}
