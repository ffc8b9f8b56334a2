use std::time::Duration;

use kb_core::form::{
    AddUrlRequest, SaveCrawlingSettingsRequest, SnippetSearchRequest, StartCrawlRequest,
};
use kb_core::model::{
    CrawlingSettings, DocumentationSnippet, DocumentationUrl, Proxy, Task, TaskId, Technology,
    TechnologyVersion,
};
use kb_logging::{kb_debug, kb_warn};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use crate::{Backend, BridgeError};

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Parses a base URL and makes sure relative joins append to its path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, BridgeError> {
    let invalid = |reason: String| BridgeError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut base = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Backend reached over HTTP: `POST {base}/invoke/{command}` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(settings: &BridgeSettings) -> Result<Self, BridgeError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BridgeError::Transport {
                command: "client".to_string(),
                message: err.to_string(),
            })?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, BridgeError> {
        self.base
            .join(path)
            .map_err(|err| BridgeError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: err.to_string(),
            })
    }

    pub async fn invoke<A, T>(&self, command: &str, args: &A) -> Result<T, BridgeError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&format!("invoke/{command}"))?;
        let body = serde_json::to_vec(args).map_err(|source| BridgeError::Encode {
            command: command.to_string(),
            source,
        })?;
        kb_debug!("invoke {} ({} bytes)", command, body.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| BridgeError::from_reqwest(command, err))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| BridgeError::from_reqwest(command, err))?;

        if !status.is_success() {
            let message = backend_message(&bytes, status.canonical_reason());
            kb_warn!("{} failed with {}: {}", command, status.as_u16(), message);
            return Err(BridgeError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes[..]
        };
        serde_json::from_slice(payload).map_err(|err| BridgeError::Decode {
            command: command.to_string(),
            message: err.to_string(),
        })
    }
}

/// Extracts the human-readable error text from a failed response body.
///
/// Accepts a JSON string, an object with `error` or `message`, or plain text.
fn backend_message(body: &[u8], reason: Option<&str>) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return reason.unwrap_or("request failed").to_string();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(message)) => message,
        Ok(Value::Object(fields)) => ["error", "message"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string()),
        _ => text.to_string(),
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn get_technologies(&self) -> Result<Vec<Technology>, BridgeError> {
        self.invoke("get_technologies", &json!({})).await
    }

    async fn get_technology_versions(
        &self,
        technology_id: Uuid,
    ) -> Result<Vec<TechnologyVersion>, BridgeError> {
        self.invoke(
            "get_technology_versions",
            &json!({ "technologyId": technology_id }),
        )
        .await
    }

    async fn create_technology(
        &self,
        name: &str,
        language: Option<&str>,
    ) -> Result<Technology, BridgeError> {
        self.invoke(
            "create_technology",
            &json!({ "name": name, "language": language }),
        )
        .await
    }

    async fn create_technology_version(
        &self,
        technology_id: Uuid,
        version: &str,
    ) -> Result<TechnologyVersion, BridgeError> {
        self.invoke(
            "create_technology_version",
            &json!({ "technologyId": technology_id, "version": version }),
        )
        .await
    }

    async fn delete_technology(&self, technology_id: Uuid) -> Result<bool, BridgeError> {
        self.invoke("delete_technology", &json!({ "technologyId": technology_id }))
            .await
    }

    async fn delete_technology_version(&self, version_id: Uuid) -> Result<bool, BridgeError> {
        self.invoke(
            "delete_technology_version",
            &json!({ "versionId": version_id }),
        )
        .await
    }

    async fn add_documentation_url(
        &self,
        request: &AddUrlRequest,
    ) -> Result<DocumentationUrl, BridgeError> {
        self.invoke("add_documentation_url", request).await
    }

    async fn get_version_documentation_urls(
        &self,
        version_id: Uuid,
    ) -> Result<Vec<DocumentationUrl>, BridgeError> {
        self.invoke(
            "get_version_documentation_urls",
            &json!({ "versionId": version_id, "includeContent": false }),
        )
        .await
    }

    async fn get_full_documentation_url(
        &self,
        url_id: Uuid,
    ) -> Result<Option<DocumentationUrl>, BridgeError> {
        self.invoke("get_full_documentation_url", &json!({ "urlId": url_id }))
            .await
    }

    async fn get_version_snippets(
        &self,
        version_id: Uuid,
    ) -> Result<Vec<DocumentationSnippet>, BridgeError> {
        self.invoke("get_version_snippets", &json!({ "versionId": version_id }))
            .await
    }

    async fn get_full_snippet(
        &self,
        snippet_id: Uuid,
    ) -> Result<Option<DocumentationSnippet>, BridgeError> {
        self.invoke("get_full_snippet", &json!({ "snippetId": snippet_id }))
            .await
    }

    async fn vector_search(
        &self,
        request: &SnippetSearchRequest,
    ) -> Result<Vec<DocumentationSnippet>, BridgeError> {
        self.invoke("vector_search", request).await
    }

    async fn get_version_crawling_settings(
        &self,
        version_id: Uuid,
    ) -> Result<CrawlingSettings, BridgeError> {
        let settings: Option<CrawlingSettings> = self
            .invoke(
                "get_version_crawling_settings",
                &json!({ "versionId": version_id }),
            )
            .await?;
        Ok(settings.unwrap_or_else(|| CrawlingSettings::empty(version_id)))
    }

    async fn save_version_crawling_settings(
        &self,
        request: &SaveCrawlingSettingsRequest,
    ) -> Result<CrawlingSettings, BridgeError> {
        self.invoke("save_version_crawling_settings", request).await
    }

    async fn start_crawling(&self, request: &StartCrawlRequest) -> Result<TaskId, BridgeError> {
        self.invoke("start_crawling", request).await
    }

    async fn apply_url_filters(&self, version_id: Uuid) -> Result<usize, BridgeError> {
        self.invoke("apply_url_filters", &json!({ "versionId": version_id }))
            .await
    }

    async fn stop_all_crawling(&self) -> Result<(), BridgeError> {
        self.invoke("stop_all_crawling", &json!({})).await
    }

    async fn stop_tech_version_crawling(
        &self,
        technology_id: Uuid,
        version_id: Uuid,
    ) -> Result<(), BridgeError> {
        self.invoke(
            "stop_tech_version_crawling",
            &json!({ "technologyId": technology_id, "versionId": version_id }),
        )
        .await
    }

    async fn clean_markdown(&self, url_ids: &[Uuid]) -> Result<Vec<TaskId>, BridgeError> {
        self.invoke("clean_markdown", &json!({ "urlIds": url_ids }))
            .await
    }

    async fn generate_snippets(&self, url_ids: &[Uuid]) -> Result<Vec<TaskId>, BridgeError> {
        self.invoke("generate_snippets", &json!({ "urlIds": url_ids }))
            .await
    }

    async fn get_tasks(&self) -> Result<Vec<Task>, BridgeError> {
        self.invoke("get_tasks", &json!({})).await
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), BridgeError> {
        self.invoke("cancel_task", &json!({ "taskId": task_id }))
            .await
    }

    async fn get_proxies(&self) -> Result<Vec<Proxy>, BridgeError> {
        self.invoke("get_proxies", &json!({})).await
    }

    async fn fetch_and_save_proxies(&self) -> Result<Vec<Proxy>, BridgeError> {
        self.invoke("fetch_and_save_proxies", &json!({})).await
    }
}
