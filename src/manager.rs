// Task board state: the collection, the active filter and every mutation

use eyre::{Result, eyre};
use tracing::{debug, info};

use crate::filter::TaskFilter;
use crate::kv::KvStore;
use crate::models::{Status, Subtask, Task, TaskDraft, TaskUpdate};
use crate::persisted::PersistedStore;
use crate::record::{self, Record};

/// Owns the task collection and the active filter
///
/// Tasks stay in creation order. Every mutation that changes the collection is
/// written through to the backing slot before the call returns; operations that
/// target an unknown id change nothing, write nothing, and report the miss
/// through their return value instead of an error.
pub struct TaskManager<S: KvStore> {
    tasks: PersistedStore<Vec<Task>, S>,
    filter: TaskFilter,
}

impl<S: KvStore> TaskManager<S> {
    /// Load the board from the default task slot
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, Task::collection_name())
    }

    /// Load the board from a custom slot
    pub fn with_key(backend: S, key: &str) -> Self {
        let tasks = PersistedStore::new(backend, key, Vec::new());
        info!(key, count = tasks.get().len(), "Loaded task board");
        Self {
            tasks,
            filter: TaskFilter::default(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task at the end of the board, returning its id
    ///
    /// Fails without touching the board if a draft subtask has a blank title.
    pub fn create_task(&mut self, draft: TaskDraft) -> Result<String> {
        let task = Task::from_draft(draft)?;
        let id = task.id.clone();
        debug!(id = %id, status = %task.status, "create_task");

        self.tasks.update(|tasks| tasks.push(task))?;
        Ok(id)
    }

    /// Merge `update` into the task, returning false if no task has `id`
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<bool> {
        self.mutate(id, |task| task.apply(update))
    }

    /// Remove the task permanently, returning false if no task has `id`
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.tasks.get().iter().position(|t| t.id == id) else {
            debug!(id, "delete_task: no such task");
            return Ok(false);
        };

        self.tasks.update(|tasks| tasks.remove(pos))?;
        debug!(id, "delete_task: removed");
        Ok(true)
    }

    /// Move the task to another column
    pub fn move_task(&mut self, id: &str, status: Status) -> Result<bool> {
        self.update_task(id, TaskUpdate::status(status))
    }

    /// Append a checklist item, returning its id or `None` if no task has `task_id`
    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> Result<Option<String>> {
        if title.trim().is_empty() {
            return Err(eyre!("Subtask title cannot be empty or whitespace-only"));
        }

        let subtask = Subtask::new(title);
        let subtask_id = subtask.id.clone();

        let found = self.mutate(task_id, |task| {
            task.subtasks.push(subtask);
            task.touch();
        })?;

        Ok(found.then_some(subtask_id))
    }

    /// Flip a checklist item, returning false if either id is unknown
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool> {
        let known = self
            .get(task_id)
            .is_some_and(|task| task.subtask(subtask_id).is_some());
        if !known {
            debug!(task_id, subtask_id, "toggle_subtask: no such subtask");
            return Ok(false);
        }

        self.mutate(task_id, |task| {
            if let Some(subtask) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                subtask.completed = !subtask.completed;
            }
            task.touch();
        })
    }

    /// Apply `f` to the task with `id` and persist, or do nothing if it is missing
    fn mutate(&mut self, id: &str, f: impl FnOnce(&mut Task)) -> Result<bool> {
        if record::find(self.tasks.get(), id).is_none() {
            debug!(id, "No such task, nothing to do");
            return Ok(false);
        }

        self.tasks.update(|tasks| {
            if let Some(task) = record::find_mut(tasks, id) {
                f(task);
            }
        })?;
        Ok(true)
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Replace the active filter wholesale
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn toggle_filter_tag(&mut self, tag: &str) {
        self.filter.toggle_tag(tag);
    }

    /// Drop tag, priority and status constraints, keeping the search text
    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// Tasks passing the active filter, in board order
    ///
    /// Recomputed on every call.
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.tasks.get().iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// Filtered tasks in one column
    pub fn column(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .get()
            .iter()
            .filter(|t| t.status == status && self.filter.matches(t))
            .collect()
    }

    /// Distinct tags across all tasks, in first-seen order
    pub fn all_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.tasks.get().iter().flat_map(|t| t.tags.iter()) {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        tags
    }

    // ========================================================================
    // Unfiltered access
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        self.tasks.get()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        record::find(self.tasks.get(), id)
    }

    /// Resolve a unique id prefix to a full task id
    pub fn resolve_id(&self, prefix: &str) -> Option<&str> {
        record::resolve_prefix(self.tasks.get(), prefix)
    }

    pub fn len(&self) -> usize {
        self.tasks.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.get().is_empty()
    }

    pub fn backend(&self) -> &S {
        self.tasks.backend()
    }
}
