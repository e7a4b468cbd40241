// Data models for the task board

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::record::Record;

/// Storage key the task collection is persisted under
pub const TASKS_KEY: &str = "taskflow-tasks";

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// All columns, in board order
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Column heading
    pub fn title(&self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "todo" => Ok(Status::Todo),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(eyre!(
                "Invalid status: {:?} (expected one of: todo, in-progress, done)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(eyre!(
                "Invalid priority: {:?} (expected one of: low, medium, high)",
                other
            )),
        }
    }
}

/// Checklist item owned by a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Subtask {
    pub fn new(title: &str) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            completed: false,
            created_at: now(),
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub subtasks: Vec<Subtask>,
    pub notes: String,
}

impl Task {
    /// Build a fresh task from a draft, assigning id and timestamps
    ///
    /// Draft subtasks get trimmed titles and ids that are unique within the
    /// task; a repeated id is replaced with a fresh one. Blank subtask titles
    /// are rejected.
    pub fn from_draft(draft: TaskDraft) -> Result<Self> {
        let subtasks = normalize_subtasks(draft.subtasks)?;
        let created_at = now();
        Ok(Self {
            id: new_id(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            tags: normalize_tags(draft.tags),
            due_date: draft.due_date,
            created_at,
            updated_at: created_at,
            subtasks,
            notes: draft.notes,
        })
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at).max(self.created_at);
    }

    /// Merge a partial update into this task
    pub fn apply(&mut self, update: TaskUpdate) {
        let TaskUpdate {
            title,
            description,
            notes,
            status,
            priority,
            tags,
            due_date,
        } = update;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(tags) = tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        self.touch();
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    /// Completed and total subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }

    /// Due strictly before `today` and not yet done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Status::Done && self.due_date.is_some_and(|due| due < today)
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        TASKS_KEY
    }
}

/// Everything a caller supplies when creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub notes: String,
    pub status: Status,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    /// Draft with empty text fields, medium priority, in the given column
    pub fn new(title: impl Into<String>, status: Status) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            notes: String::new(),
            status,
            priority: Priority::Medium,
            tags: Vec::new(),
            due_date: None,
            subtasks: Vec::new(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update; `None` fields are left untouched
///
/// `due_date` is doubly optional: `Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Trim tags, dropping blanks and repeats while keeping first-seen order
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Trim subtask titles and make ids unique, rejecting blank titles
fn normalize_subtasks(subtasks: Vec<Subtask>) -> Result<Vec<Subtask>> {
    let mut out: Vec<Subtask> = Vec::with_capacity(subtasks.len());
    for mut subtask in subtasks {
        let title = subtask.title.trim();
        if title.is_empty() {
            return Err(eyre!("Subtask title cannot be empty or whitespace-only"));
        }
        subtask.title = title.to_string();
        if subtask.id.trim().is_empty() || out.iter().any(|s| s.id == subtask.id) {
            subtask.id = new_id();
        }
        out.push(subtask);
    }
    Ok(out)
}

/// Parse comma-separated tag input ("docs, urgent,,")
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Parse a `YYYY-MM-DD` due date
pub fn parse_due_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| eyre!("Invalid due date {:?} (expected YYYY-MM-DD): {}", input, e))
}

/// Fresh opaque identifier
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Helper function to get the current timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
