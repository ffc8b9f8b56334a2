use kb_core::form::{
    AddUrlRequest, SaveCrawlingSettingsRequest, SnippetSearchRequest, StartCrawlRequest,
};
use kb_core::model::{
    CrawlingSettings, DocumentationSnippet, DocumentationUrl, Proxy, Task, TaskId, Technology,
    TechnologyVersion,
};
use uuid::Uuid;

use crate::BridgeError;

/// The backend's remote command surface, one method per command.
///
/// Every call is a single attempt. Implementations must not retry.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn get_technologies(&self) -> Result<Vec<Technology>, BridgeError>;

    async fn get_technology_versions(
        &self,
        technology_id: Uuid,
    ) -> Result<Vec<TechnologyVersion>, BridgeError>;

    async fn create_technology(
        &self,
        name: &str,
        language: Option<&str>,
    ) -> Result<Technology, BridgeError>;

    async fn create_technology_version(
        &self,
        technology_id: Uuid,
        version: &str,
    ) -> Result<TechnologyVersion, BridgeError>;

    async fn delete_technology(&self, technology_id: Uuid) -> Result<bool, BridgeError>;

    async fn delete_technology_version(&self, version_id: Uuid) -> Result<bool, BridgeError>;

    async fn add_documentation_url(
        &self,
        request: &AddUrlRequest,
    ) -> Result<DocumentationUrl, BridgeError>;

    /// URL list of a version, without the large text bodies.
    async fn get_version_documentation_urls(
        &self,
        version_id: Uuid,
    ) -> Result<Vec<DocumentationUrl>, BridgeError>;

    async fn get_full_documentation_url(
        &self,
        url_id: Uuid,
    ) -> Result<Option<DocumentationUrl>, BridgeError>;

    async fn get_version_snippets(
        &self,
        version_id: Uuid,
    ) -> Result<Vec<DocumentationSnippet>, BridgeError>;

    async fn get_full_snippet(
        &self,
        snippet_id: Uuid,
    ) -> Result<Option<DocumentationSnippet>, BridgeError>;

    async fn vector_search(
        &self,
        request: &SnippetSearchRequest,
    ) -> Result<Vec<DocumentationSnippet>, BridgeError>;

    /// Saved settings, or empty ones when the version has none yet.
    async fn get_version_crawling_settings(
        &self,
        version_id: Uuid,
    ) -> Result<CrawlingSettings, BridgeError>;

    async fn save_version_crawling_settings(
        &self,
        request: &SaveCrawlingSettingsRequest,
    ) -> Result<CrawlingSettings, BridgeError>;

    async fn start_crawling(&self, request: &StartCrawlRequest) -> Result<TaskId, BridgeError>;

    /// Number of URLs the backend marked as skipped.
    async fn apply_url_filters(&self, version_id: Uuid) -> Result<usize, BridgeError>;

    async fn stop_all_crawling(&self) -> Result<(), BridgeError>;

    async fn stop_tech_version_crawling(
        &self,
        technology_id: Uuid,
        version_id: Uuid,
    ) -> Result<(), BridgeError>;

    async fn clean_markdown(&self, url_ids: &[Uuid]) -> Result<Vec<TaskId>, BridgeError>;

    async fn generate_snippets(&self, url_ids: &[Uuid]) -> Result<Vec<TaskId>, BridgeError>;

    async fn get_tasks(&self) -> Result<Vec<Task>, BridgeError>;

    async fn cancel_task(&self, task_id: &str) -> Result<(), BridgeError>;

    async fn get_proxies(&self) -> Result<Vec<Proxy>, BridgeError>;

    async fn fetch_and_save_proxies(&self) -> Result<Vec<Proxy>, BridgeError>;
}
