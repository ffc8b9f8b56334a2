//! Push notifications delivered by the backend's event channel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{null_default, TaskId, TaskStage};

/// Metadata attached to a freshly created crawl task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub prefix_path: String,
    #[serde(default, deserialize_with = "null_default")]
    pub anti_paths: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub anti_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub skip_processed: bool,
    #[serde(default)]
    pub url_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedResult {
    #[serde(default)]
    pub snippets_count: Option<usize>,
    #[serde(default)]
    pub url_id: Option<Uuid>,
}

/// Events of the per-crawl channel.
///
/// Older backends send PascalCase variants with snake_case fields; both
/// spellings decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum CrawlEvent {
    #[serde(rename_all = "camelCase", alias = "Started")]
    Started {
        #[serde(alias = "task_id")]
        task_id: TaskId,
        url: String,
    },
    #[serde(rename_all = "camelCase", alias = "Progress")]
    Progress {
        #[serde(default, alias = "task_id")]
        task_id: Option<TaskId>,
        #[serde(alias = "url_count")]
        url_count: usize,
        #[serde(alias = "processed_count")]
        processed_count: usize,
    },
    #[serde(rename_all = "camelCase", alias = "UrlDiscovered")]
    UrlDiscovered {
        #[serde(default, alias = "task_id")]
        task_id: Option<TaskId>,
        url: String,
    },
    #[serde(rename_all = "camelCase", alias = "Finished")]
    Finished {
        #[serde(alias = "task_id")]
        task_id: TaskId,
        #[serde(alias = "total_urls")]
        total_urls: usize,
    },
    #[serde(rename_all = "camelCase", alias = "Error")]
    Error {
        #[serde(default, alias = "task_id")]
        task_id: Option<TaskId>,
        message: String,
    },
}

impl CrawlEvent {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            CrawlEvent::Started { task_id, .. } | CrawlEvent::Finished { task_id, .. } => {
                Some(task_id)
            }
            CrawlEvent::Progress { task_id, .. }
            | CrawlEvent::UrlDiscovered { task_id, .. }
            | CrawlEvent::Error { task_id, .. } => task_id.as_deref(),
        }
    }
}

/// Events of the markdown-cleaning and snippet-generation channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum JobEvent {
    #[serde(rename_all = "camelCase", alias = "Started")]
    Started {
        #[serde(alias = "url_count")]
        url_count: usize,
    },
    #[serde(rename_all = "camelCase", alias = "Progress")]
    Progress {
        current: usize,
        total: usize,
        url: String,
    },
    #[serde(rename_all = "camelCase", alias = "Finished")]
    Finished {
        #[serde(alias = "task_ids")]
        task_ids: Vec<TaskId>,
    },
    #[serde(rename_all = "camelCase", alias = "Error")]
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    /// Also stands in for kinds this client does not know.
    #[default]
    #[serde(other)]
    Info,
}

/// Every notification the backend can push, tagged by its channel name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum BackendEvent {
    #[serde(rename = "task:created", rename_all = "camelCase")]
    TaskCreated {
        task_id: TaskId,
        task_type: String,
        #[serde(default)]
        metadata: TaskPayload,
    },
    #[serde(rename = "task:updated", rename_all = "camelCase")]
    TaskUpdated {
        task_id: TaskId,
        progress: f32,
        status: String,
        #[serde(default)]
        stages: Option<Vec<TaskStage>>,
    },
    #[serde(rename = "task:completed", rename_all = "camelCase")]
    TaskCompleted {
        task_id: TaskId,
        #[serde(default)]
        result: TaskCompletedResult,
    },
    #[serde(rename = "task:failed", alias = "task:error", rename_all = "camelCase")]
    TaskFailed { task_id: TaskId, error: String },
    #[serde(rename = "task:cancelled", rename_all = "camelCase")]
    TaskCancelled { task_id: TaskId },
    #[serde(rename = "processing:started", rename_all = "camelCase")]
    ProcessingStarted {
        task_id: TaskId,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        tech_id: Option<String>,
    },
    #[serde(rename = "processing:progress", rename_all = "camelCase")]
    ProcessingProgress {
        task_id: TaskId,
        stage: String,
        progress: f32,
    },
    #[serde(rename = "processing:completed", rename_all = "camelCase")]
    ProcessingCompleted { task_id: TaskId, snippets_count: i32 },
    #[serde(rename = "url:status:updated", rename_all = "camelCase")]
    UrlStatusUpdated { url_id: Uuid, status: String },
    #[serde(rename = "app:notification", rename_all = "camelCase")]
    AppNotification {
        title: String,
        message: String,
        #[serde(default)]
        notification_type: Option<NotificationKind>,
    },
    #[serde(rename = "crawl")]
    Crawl(CrawlEvent),
    #[serde(rename = "markdown")]
    Markdown(JobEvent),
    #[serde(rename = "snippets")]
    Snippets(JobEvent),
}

impl BackendEvent {
    /// Channel name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            BackendEvent::TaskCreated { .. } => "task:created",
            BackendEvent::TaskUpdated { .. } => "task:updated",
            BackendEvent::TaskCompleted { .. } => "task:completed",
            BackendEvent::TaskFailed { .. } => "task:failed",
            BackendEvent::TaskCancelled { .. } => "task:cancelled",
            BackendEvent::ProcessingStarted { .. } => "processing:started",
            BackendEvent::ProcessingProgress { .. } => "processing:progress",
            BackendEvent::ProcessingCompleted { .. } => "processing:completed",
            BackendEvent::UrlStatusUpdated { .. } => "url:status:updated",
            BackendEvent::AppNotification { .. } => "app:notification",
            BackendEvent::Crawl(_) => "crawl",
            BackendEvent::Markdown(_) => "markdown",
            BackendEvent::Snippets(_) => "snippets",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_error_alias_reads_as_failed() {
        let event: BackendEvent = serde_json::from_value(json!({
            "event": "task:error",
            "payload": {"taskId": "t-1", "error": "boom"},
        }))
        .unwrap();
        assert_eq!(
            event,
            BackendEvent::TaskFailed {
                task_id: "t-1".into(),
                error: "boom".into()
            }
        );
        assert_eq!(event.name(), "task:failed");
    }

    #[test]
    fn nested_crawl_channel_event_parses() {
        let event: BackendEvent = serde_json::from_value(json!({
            "event": "crawl",
            "payload": {"event": "finished", "data": {"taskId": "c-9", "totalUrls": 12}},
        }))
        .unwrap();
        assert_eq!(
            event,
            BackendEvent::Crawl(CrawlEvent::Finished {
                task_id: "c-9".into(),
                total_urls: 12
            })
        );
    }

    #[test]
    fn created_task_tolerates_missing_metadata() {
        let event: BackendEvent = serde_json::from_value(json!({
            "event": "task:created",
            "payload": {"taskId": "t-2", "taskType": "crawl"},
        }))
        .unwrap();
        match event {
            BackendEvent::TaskCreated { metadata, .. } => assert_eq!(metadata, TaskPayload::default()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
