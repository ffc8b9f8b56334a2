use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{derive_task_progress, process_tasks};
use crate::event::{CrawlEvent, TaskPayload};
use crate::model::{StageStatus, Task, TaskId, TaskStage, TaskStatus};

/// Backend tasks keyed by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskStore {
    tasks: BTreeMap<TaskId, Task>,
    pub loading: bool,
    pub error: Option<String>,
    /// Tasks for which a cancel call is in flight.
    cancel_requested: BTreeSet<TaskId>,
}

impl TaskStore {
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks ordered by creation time, oldest first.
    pub fn all(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.values().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    pub fn active(&self) -> Vec<&Task> {
        self.all()
            .into_iter()
            .filter(|task| !task.status.is_finished())
            .collect()
    }

    pub fn finished(&self) -> Vec<&Task> {
        self.all()
            .into_iter()
            .filter(|task| task.status.is_finished())
            .collect()
    }

    pub fn is_cancel_requested(&self, id: &str) -> bool {
        self.cancel_requested.contains(id)
    }

    pub fn mark_cancel_requested(&mut self, id: &str) {
        self.cancel_requested.insert(id.to_string());
    }

    pub fn clear_cancel_requested(&mut self, id: &str) {
        self.cancel_requested.remove(id);
    }

    /// Merges a batch after deduping it and deriving stage aggregates.
    pub fn merge_tasks(&mut self, batch: Vec<Task>) {
        for task in process_tasks(batch) {
            self.tasks.insert(task.id.clone(), task);
        }
        self.loading = false;
    }

    pub fn replace(&mut self, batch: Vec<Task>) {
        self.tasks.clear();
        self.merge_tasks(batch);
        self.error = None;
    }

    fn entry(&mut self, id: &str, task_type: &str) -> &mut Task {
        self.tasks
            .entry(id.to_string())
            .or_insert_with(|| Task::new(id, task_type))
    }

    pub fn on_created(&mut self, id: &str, task_type: &str, metadata: &TaskPayload) {
        let task = self.entry(id, task_type);
        task.task_type = task_type.to_string();
        if let Ok(payload) = serde_json::to_value(metadata) {
            task.payload = payload;
        }
    }

    pub fn on_updated(
        &mut self,
        id: &str,
        progress: f32,
        status: &str,
        stages: Option<Vec<TaskStage>>,
    ) {
        let task = self.entry(id, "");
        task.progress = progress.clamp(0.0, 100.0);
        if let Some(status) = TaskStatus::parse(status) {
            task.status = status;
        }
        if let Some(stages) = stages {
            task.stages = stages;
        }
        derive_task_progress(task);
    }

    /// A named processing stage moved; stages earlier in the list are done.
    pub fn on_stage_progress(&mut self, id: &str, stage: &str, progress: f32) {
        let task = self.entry(id, "");
        let progress = progress.clamp(0.0, 100.0);
        let status = if progress >= 100.0 {
            StageStatus::Completed
        } else {
            StageStatus::Active
        };
        match task.stages.iter().position(|s| s.name == stage) {
            Some(index) => {
                task.stages[index].progress = progress;
                task.stages[index].status = status;
                for earlier in &mut task.stages[..index] {
                    if earlier.status != StageStatus::Failed {
                        earlier.progress = 100.0;
                        earlier.status = StageStatus::Completed;
                    }
                }
            }
            None => task.stages.push(TaskStage::new(stage, progress, status)),
        }
        derive_task_progress(task);
    }

    pub fn on_processing_started(&mut self, id: &str, url: Option<&str>) {
        let task = self.entry(id, "processing");
        if !task.status.is_finished() {
            task.status = TaskStatus::Running;
        }
        if let (Some(url), true) = (url, task.payload.is_null()) {
            task.payload = serde_json::json!({ "url": url });
        }
    }

    pub fn on_completed(&mut self, id: &str) {
        let task = self.entry(id, "");
        task.status = TaskStatus::Completed;
        task.progress = 100.0;
        for stage in &mut task.stages {
            if stage.status != StageStatus::Failed {
                stage.status = StageStatus::Completed;
                stage.progress = 100.0;
            }
        }
        self.cancel_requested.remove(id);
    }

    pub fn on_failed(&mut self, id: &str, error: &str) {
        let task = self.entry(id, "");
        task.status = TaskStatus::Failed;
        task.error = Some(error.to_string());
        if let Some(stage) = task
            .stages
            .iter_mut()
            .find(|stage| stage.status == StageStatus::Active)
        {
            stage.status = StageStatus::Failed;
        }
        self.cancel_requested.remove(id);
    }

    pub fn on_cancelled(&mut self, id: &str) {
        let task = self.entry(id, "");
        task.status = TaskStatus::Cancelled;
        self.cancel_requested.remove(id);
    }

    /// Mirrors the crawl channel into the task list.
    pub fn on_crawl_event(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Started { task_id, url } => {
                let task = self.entry(task_id, "crawl");
                task.status = TaskStatus::Running;
                if task.payload.is_null() {
                    task.payload = serde_json::json!({ "url": url });
                }
            }
            CrawlEvent::Progress {
                task_id: Some(task_id),
                url_count,
                processed_count,
            } => {
                let task = self.entry(task_id, "crawl");
                task.status = TaskStatus::Running;
                if *url_count > 0 {
                    let ratio = *processed_count as f32 / *url_count as f32;
                    task.progress = (ratio * 100.0).clamp(0.0, 100.0).round();
                }
            }
            CrawlEvent::Finished { task_id, .. } => self.on_completed(task_id),
            CrawlEvent::Error {
                task_id: Some(task_id),
                message,
            } => self.on_failed(task_id, message),
            _ => {}
        }
    }
}
