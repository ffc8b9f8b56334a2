//! Entity shapes as mirrored by the client.
//!
//! The backend owns these records; the client only deserializes them. Wire
//! names are camelCase and every optional field tolerates being absent or
//! `null`, falling back to an empty value or the current timestamp.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type TaskId = String;

fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Treats an explicit `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_now<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NaiveDateTime>::deserialize(deserializer)?.unwrap_or_else(now_naive))
}

fn null_now_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(now_utc))
}

/// Accepts `["a", null, "b"]` and drops the holes.
fn sparse_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

/// Accepts either a comma-separated string or a list of strings.
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        Items(Vec<Option<String>>),
    }

    let items = match Option::<Raw>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Raw::Joined(text)) => split_list(&text),
        Some(Raw::Items(items)) => items
            .into_iter()
            .flatten()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    };
    Ok(items)
}

/// Splits user or backend text on commas and newlines, trimming and dropping empties.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "sparse_strings")]
    pub related: Vec<String>,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyVersion {
    pub id: Uuid,
    pub technology_id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub version: String,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub updated_at: NaiveDateTime,
}

/// Lifecycle status of a documentation URL.
///
/// The set is closed: anything the backend sends that is not listed here is
/// read as [`UrlStatus::PendingCrawl`], which is also the backend's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UrlStatus {
    #[default]
    PendingCrawl,
    Crawling,
    Crawled,
    CrawlError,
    PendingMarkdown,
    ConvertingMarkdown,
    MarkdownReady,
    MarkdownError,
    PendingProcessing,
    Processing,
    Processed,
    ProcessingError,
    Skipped,
}

/// Colour family of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Active,
    Success,
    Error,
    Muted,
}

impl UrlStatus {
    pub const ALL: [UrlStatus; 13] = [
        UrlStatus::PendingCrawl,
        UrlStatus::Crawling,
        UrlStatus::Crawled,
        UrlStatus::CrawlError,
        UrlStatus::PendingMarkdown,
        UrlStatus::ConvertingMarkdown,
        UrlStatus::MarkdownReady,
        UrlStatus::MarkdownError,
        UrlStatus::PendingProcessing,
        UrlStatus::Processing,
        UrlStatus::Processed,
        UrlStatus::ProcessingError,
        UrlStatus::Skipped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrlStatus::PendingCrawl => "pending_crawl",
            UrlStatus::Crawling => "crawling",
            UrlStatus::Crawled => "crawled",
            UrlStatus::CrawlError => "crawl_error",
            UrlStatus::PendingMarkdown => "pending_markdown",
            UrlStatus::ConvertingMarkdown => "converting_markdown",
            UrlStatus::MarkdownReady => "markdown_ready",
            UrlStatus::MarkdownError => "markdown_error",
            UrlStatus::PendingProcessing => "pending_processing",
            UrlStatus::Processing => "processing",
            UrlStatus::Processed => "processed",
            UrlStatus::ProcessingError => "processing_error",
            UrlStatus::Skipped => "skipped",
        }
    }

    /// Strict parse; unlike the wire conversion this rejects unknown names.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|status| status.as_str() == needle)
    }

    pub fn badge_label(self) -> &'static str {
        match self {
            UrlStatus::PendingCrawl => "Pending",
            UrlStatus::Crawling => "Crawling",
            UrlStatus::Crawled => "Crawled",
            UrlStatus::CrawlError => "Crawl error",
            UrlStatus::PendingMarkdown => "Markdown pending",
            UrlStatus::ConvertingMarkdown => "Converting",
            UrlStatus::MarkdownReady => "Markdown ready",
            UrlStatus::MarkdownError => "Markdown error",
            UrlStatus::PendingProcessing => "Processing pending",
            UrlStatus::Processing => "Processing",
            UrlStatus::Processed => "Processed",
            UrlStatus::ProcessingError => "Processing error",
            UrlStatus::Skipped => "Skipped",
        }
    }

    pub fn badge_tone(self) -> BadgeTone {
        match self {
            UrlStatus::PendingCrawl | UrlStatus::PendingMarkdown | UrlStatus::PendingProcessing => {
                BadgeTone::Neutral
            }
            UrlStatus::Crawling | UrlStatus::ConvertingMarkdown | UrlStatus::Processing => {
                BadgeTone::Active
            }
            UrlStatus::Crawled | UrlStatus::MarkdownReady | UrlStatus::Processed => {
                BadgeTone::Success
            }
            UrlStatus::CrawlError | UrlStatus::MarkdownError | UrlStatus::ProcessingError => {
                BadgeTone::Error
            }
            UrlStatus::Skipped => BadgeTone::Muted,
        }
    }
}

impl From<String> for UrlStatus {
    fn from(raw: String) -> Self {
        UrlStatus::parse(&raw).unwrap_or_default()
    }
}

impl From<UrlStatus> for String {
    fn from(status: UrlStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationUrl {
    pub id: Uuid,
    pub technology_id: Uuid,
    pub version_id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: UrlStatus,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub cleaned_markdown: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub is_processed: bool,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub updated_at: NaiveDateTime,
}

impl DocumentationUrl {
    /// Whether any of the large text bodies was loaded.
    pub fn has_content(&self) -> bool {
        self.html.is_some() || self.markdown.is_some() || self.cleaned_markdown.is_some()
    }

    /// Drops the large bodies, keeping only the list-view fields.
    pub fn without_content(mut self) -> Self {
        self.html = None;
        self.markdown = None;
        self.cleaned_markdown = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationSnippet {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_default")]
    pub source_url: String,
    pub technology_id: Uuid,
    pub version_id: Uuid,
    #[serde(default, deserialize_with = "sparse_strings")]
    pub concepts: Vec<String>,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now_naive", deserialize_with = "null_now")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Lenient parse of status strings carried by progress events.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" => Some(TaskStatus::Queued),
            "running" | "active" | "processing" => Some(TaskStatus::Running),
            "completed" | "done" => Some(TaskStatus::Completed),
            "failed" | "error" => Some(TaskStatus::Failed),
            "cancelled" | "canceled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    #[serde(alias = "running")]
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStage {
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub progress: f32,
    #[serde(default, deserialize_with = "null_default")]
    pub status: StageStatus,
}

impl TaskStage {
    pub fn new(name: impl Into<String>, progress: f32, status: StageStatus) -> Self {
        Self {
            name: name.into(),
            progress,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_default")]
    pub task_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub progress: f32,
    #[serde(default)]
    pub technology_id: Option<Uuid>,
    #[serde(default)]
    pub version_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_default")]
    pub stages: Vec<TaskStage>,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default = "now_utc", deserialize_with = "null_now_utc")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, task_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            status: TaskStatus::Queued,
            progress: 0.0,
            technology_id: None,
            version_id: None,
            stages: Vec::new(),
            payload: serde_json::Value::Null,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_stages(mut self, stages: Vec<TaskStage>) -> Self {
        self.stages = stages;
        self
    }

    /// URL the task works on, if the payload names one.
    pub fn payload_url(&self) -> Option<&str> {
        self.payload.get("url").and_then(serde_json::Value::as_str)
    }
}

/// Per-version crawl configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlingSettings {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub version_id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub prefix_path: String,
    #[serde(default, deserialize_with = "comma_list")]
    pub anti_paths: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub anti_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub skip_processed: bool,
}

impl CrawlingSettings {
    pub fn empty(version_id: Uuid) -> Self {
        Self {
            version_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(default)]
    pub last_used: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_tolerates_missing_and_null_fields() {
        let id = Uuid::new_v4();
        let raw = json!({
            "id": id,
            "technologyId": Uuid::nil(),
            "versionId": Uuid::nil(),
            "url": null,
            "status": "markdown_ready",
        });
        let url: DocumentationUrl = serde_json::from_value(raw).unwrap();
        assert_eq!(url.id, id);
        assert_eq!(url.url, "");
        assert_eq!(url.status, UrlStatus::MarkdownReady);
        assert!(url.html.is_none());
        assert!(!url.is_processed);
    }

    #[test]
    fn unknown_status_reads_as_pending_crawl() {
        let status: UrlStatus = serde_json::from_value(json!("teleporting")).unwrap();
        assert_eq!(status, UrlStatus::PendingCrawl);
        assert_eq!(serde_json::to_value(UrlStatus::CrawlError).unwrap(), json!("crawl_error"));
    }

    #[test]
    fn every_status_round_trips_through_its_name() {
        for status in UrlStatus::ALL {
            assert_eq!(UrlStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(UrlStatus::parse("Markdown-Ready"), Some(UrlStatus::MarkdownReady));
    }

    #[test]
    fn snippet_concepts_drop_null_entries() {
        let raw = json!({
            "id": Uuid::new_v4(),
            "title": "Routing",
            "technologyId": Uuid::nil(),
            "versionId": Uuid::nil(),
            "concepts": ["router", null, "middleware"],
        });
        let snippet: DocumentationSnippet = serde_json::from_value(raw).unwrap();
        assert_eq!(snippet.concepts, vec!["router", "middleware"]);
        assert_eq!(snippet.description, "");
    }

    #[test]
    fn settings_accept_comma_strings_and_arrays() {
        let from_string: CrawlingSettings = serde_json::from_value(json!({
            "versionId": Uuid::nil(),
            "prefixPath": "https://docs.rs/tokio",
            "antiPaths": "/blog, /changelog,,",
            "antiKeywords": null,
        }))
        .unwrap();
        assert_eq!(from_string.anti_paths, vec!["/blog", "/changelog"]);
        assert!(from_string.anti_keywords.is_empty());

        let from_array: CrawlingSettings = serde_json::from_value(json!({
            "versionId": Uuid::nil(),
            "antiKeywords": [" deprecated ", ""],
        }))
        .unwrap();
        assert_eq!(from_array.anti_keywords, vec!["deprecated"]);
        assert_eq!(from_array.prefix_path, "");
    }

    #[test]
    fn stage_status_accepts_running_alias() {
        let stage: TaskStage =
            serde_json::from_value(json!({"name": "fetch", "progress": 10, "status": "running"}))
                .unwrap();
        assert_eq!(stage.status, StageStatus::Active);
    }
}
