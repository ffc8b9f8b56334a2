//! Batch aggregation of tasks and events coming from the backend.
//!
//! Everything here is pure and linear in the batch size; the background
//! thread that runs it lives in the bridge crate.

use std::collections::HashMap;
use std::hash::Hash;

use uuid::Uuid;

use crate::event::{BackendEvent, CrawlEvent};
use crate::model::{StageStatus, Task, TaskStatus};

/// Identity under which repeated events collapse to the most recent one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Task(String),
    Url(Uuid),
    Technology(String),
}

impl BackendEvent {
    /// Dedupe key, or `None` for events that must all be kept.
    pub fn key(&self) -> Option<EventKey> {
        match self {
            BackendEvent::TaskCreated { task_id, .. }
            | BackendEvent::TaskUpdated { task_id, .. }
            | BackendEvent::TaskCompleted { task_id, .. }
            | BackendEvent::TaskFailed { task_id, .. }
            | BackendEvent::TaskCancelled { task_id }
            | BackendEvent::ProcessingProgress { task_id, .. }
            | BackendEvent::ProcessingCompleted { task_id, .. } => {
                Some(EventKey::Task(task_id.clone()))
            }
            BackendEvent::ProcessingStarted {
                task_id, tech_id, ..
            } => Some(match tech_id {
                Some(tech) => EventKey::Technology(tech.clone()),
                None => EventKey::Task(task_id.clone()),
            }),
            BackendEvent::UrlStatusUpdated { url_id, .. } => Some(EventKey::Url(*url_id)),
            BackendEvent::Crawl(event) => crawl_key(event),
            BackendEvent::AppNotification { .. }
            | BackendEvent::Markdown(_)
            | BackendEvent::Snippets(_) => None,
        }
    }
}

fn crawl_key(event: &CrawlEvent) -> Option<EventKey> {
    match event {
        // Discoveries and errors are individually meaningful.
        CrawlEvent::UrlDiscovered { .. } | CrawlEvent::Error { .. } => None,
        _ => event.task_id().map(|id| EventKey::Task(id.to_string())),
    }
}

/// Keeps one entry per key: the last occurrence in input order.
///
/// Items for which `key` returns `None` are always kept. Survivors retain
/// their relative input order.
pub fn dedupe_latest<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let keys: Vec<Option<K>> = items.iter().map(&key).collect();

    // Later occurrences overwrite earlier positions.
    let mut last_index: HashMap<&K, usize> = HashMap::with_capacity(keys.len());
    for (index, item_key) in keys.iter().enumerate() {
        if let Some(k) = item_key {
            last_index.insert(k, index);
        }
    }

    let keep: Vec<bool> = keys
        .iter()
        .enumerate()
        .map(|(index, item_key)| match item_key {
            Some(k) => last_index.get(k) == Some(&index),
            None => true,
        })
        .collect();

    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

pub fn dedupe_events(events: Vec<BackendEvent>) -> Vec<BackendEvent> {
    dedupe_latest(events, BackendEvent::key)
}

/// Recomputes a task's progress and status from its stages.
///
/// Progress becomes the rounded mean of the stage progress. Status escalates:
/// any failed stage fails the task, all completed stages complete it, and any
/// active stage marks it running. Otherwise the status is left alone, as is
/// a task without stages.
pub fn derive_task_progress(task: &mut Task) {
    if task.stages.is_empty() {
        return;
    }

    let total: f32 = task.stages.iter().map(|stage| stage.progress).sum();
    task.progress = (total / task.stages.len() as f32).round();

    let has = |status: StageStatus| task.stages.iter().any(|stage| stage.status == status);
    let next = if has(StageStatus::Failed) {
        Some(TaskStatus::Failed)
    } else if task
        .stages
        .iter()
        .all(|stage| stage.status == StageStatus::Completed)
    {
        Some(TaskStatus::Completed)
    } else if has(StageStatus::Active) {
        Some(TaskStatus::Running)
    } else {
        None
    };
    if let Some(status) = next {
        task.status = status;
    }
}

/// Dedupes a task batch by id (last wins) and derives stage aggregates.
pub fn process_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut tasks = dedupe_latest(tasks, |task| Some(task.id.clone()));
    for task in &mut tasks {
        derive_task_progress(task);
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStage;

    #[test]
    fn dedupe_keeps_unkeyed_items() {
        let items = vec![(None, 1), (Some('a'), 2), (None, 3), (Some('a'), 4)];
        let out = dedupe_latest(items, |(k, _)| *k);
        assert_eq!(out, vec![(None, 1), (None, 3), (Some('a'), 4)]);
    }

    #[test]
    fn empty_stage_list_leaves_task_alone() {
        let mut task = Task::new("t", "crawl");
        task.progress = 17.0;
        task.status = TaskStatus::Running;
        derive_task_progress(&mut task);
        assert_eq!(task.progress, 17.0);
        assert_eq!(task.status, TaskStatus::Running);
    }

    #[test]
    fn pending_stages_keep_status() {
        let mut task = Task::new("t", "crawl").with_stages(vec![
            TaskStage::new("fetch", 0.0, StageStatus::Pending),
            TaskStage::new("clean", 0.0, StageStatus::Pending),
        ]);
        task.status = TaskStatus::Queued;
        derive_task_progress(&mut task);
        assert_eq!(task.status, TaskStatus::Queued);
        assert_eq!(task.progress, 0.0);
    }
}
