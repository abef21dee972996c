//! The Task record

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Priority, TaskId};

/// A single to-do item
///
/// Tasks are only created by [`crate::TaskStore::add`], which guarantees a
/// non-empty trimmed title. `id`, `title`, `priority` and `created_at` never
/// change afterwards; `completed` is flipped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    title: String,
    completed: bool,
    priority: Priority,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from an already validated title
    pub(crate) fn new(title: String, priority: Priority) -> Self {
        Self {
            id: TaskId::new(),
            title,
            completed: false,
            priority,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Flip completion, returning the new value
    pub(crate) fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}
