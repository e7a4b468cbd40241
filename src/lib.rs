// TaskBoard - Kanban task state with write-through local persistence

pub mod filter;
pub mod kv;
pub mod manager;
pub mod models;
pub mod persisted;
pub mod record;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use filter::TaskFilter;
pub use kv::{FileKv, KvStore, MemoryKv};
pub use manager::TaskManager;
pub use models::{Priority, Status, Subtask, TASKS_KEY, Task, TaskDraft, TaskUpdate, now, parse_due_date, parse_tags};
pub use persisted::PersistedStore;
pub use record::Record;
