// Board filtering

use crate::models::{Priority, Status, Task};

/// Criteria narrowing the visible tasks
///
/// All constraints are combined with AND. Within `tags` the match is OR: a task
/// passes if it carries any one of the selected tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description
    pub search: String,
    /// Selected tags, empty means any
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Select `tag` if it is not selected, deselect it otherwise
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    /// Drop tag, priority and status constraints; the search text stays
    pub fn clear(&mut self) {
        self.tags.clear();
        self.priority = None;
        self.status = None;
    }

    /// True if anything besides the search text is constraining
    pub fn has_constraints(&self) -> bool {
        !self.tags.is_empty() || self.priority.is_some() || self.status.is_some()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self.matches_tags(task)
            && self.priority.is_none_or(|p| task.priority == p)
            && self.status.is_none_or(|s| task.status == s)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
    }

    fn matches_tags(&self, task: &Task) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| task.has_tag(tag))
    }
}
