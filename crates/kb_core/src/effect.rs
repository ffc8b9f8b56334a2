use uuid::Uuid;

use crate::form::{AddUrlRequest, SaveCrawlingSettingsRequest, SnippetSearchRequest, StartCrawlRequest};
use crate::model::TaskId;

/// A remote command the front end must invoke on behalf of `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadTechnologies,
    CreateTechnology {
        name: String,
        language: Option<String>,
    },
    DeleteTechnology {
        technology_id: Uuid,
    },
    LoadVersions {
        technology_id: Uuid,
    },
    CreateVersion {
        technology_id: Uuid,
        version: String,
    },
    DeleteVersion {
        version_id: Uuid,
    },
    LoadUrls {
        version_id: Uuid,
    },
    AddUrl(AddUrlRequest),
    LoadUrlDetail {
        url_id: Uuid,
    },
    LoadSettings {
        version_id: Uuid,
    },
    SaveSettings(SaveCrawlingSettingsRequest),
    ApplyUrlFilters {
        version_id: Uuid,
    },
    StartCrawl(StartCrawlRequest),
    StopCrawling {
        technology_id: Uuid,
        version_id: Uuid,
    },
    StopAllCrawling,
    CleanMarkdown {
        url_ids: Vec<Uuid>,
    },
    GenerateSnippets {
        url_ids: Vec<Uuid>,
    },
    LoadSnippets {
        version_id: Uuid,
    },
    SearchSnippets(SnippetSearchRequest),
    LoadSnippetDetail {
        snippet_id: Uuid,
    },
    LoadTasks,
    CancelTask {
        task_id: TaskId,
    },
    LoadProxies,
    RefreshProxies,
}

impl Effect {
    /// Backend command name, used for logging.
    pub fn command_name(&self) -> &'static str {
        match self {
            Effect::LoadTechnologies => "get_technologies",
            Effect::CreateTechnology { .. } => "create_technology",
            Effect::DeleteTechnology { .. } => "delete_technology",
            Effect::LoadVersions { .. } => "get_technology_versions",
            Effect::CreateVersion { .. } => "create_technology_version",
            Effect::DeleteVersion { .. } => "delete_technology_version",
            Effect::LoadUrls { .. } => "get_version_documentation_urls",
            Effect::AddUrl(_) => "add_documentation_url",
            Effect::LoadUrlDetail { .. } => "get_full_documentation_url",
            Effect::LoadSettings { .. } => "get_version_crawling_settings",
            Effect::SaveSettings(_) => "save_version_crawling_settings",
            Effect::ApplyUrlFilters { .. } => "apply_url_filters",
            Effect::StartCrawl(_) => "start_crawling",
            Effect::StopCrawling { .. } => "stop_tech_version_crawling",
            Effect::StopAllCrawling => "stop_all_crawling",
            Effect::CleanMarkdown { .. } => "clean_markdown",
            Effect::GenerateSnippets { .. } => "generate_snippets",
            Effect::LoadSnippets { .. } => "get_version_snippets",
            Effect::SearchSnippets(_) => "vector_search",
            Effect::LoadSnippetDetail { .. } => "get_full_snippet",
            Effect::LoadTasks => "get_tasks",
            Effect::CancelTask { .. } => "cancel_task",
            Effect::LoadProxies => "get_proxies",
            Effect::RefreshProxies => "fetch_and_save_proxies",
        }
    }
}
