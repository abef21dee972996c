//! In-memory ordered task store

use serde::Serialize;
use tracing::debug;

use crate::{Priority, StoreError, Task, TaskId};

/// Completed/total counts derived from the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Whole-number percentage complete, 0 for an empty collection
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// Ordered collection of tasks
///
/// Insertion order is display order. The store is the only writer of its
/// tasks; callers get copies or shared references.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and append a task
    ///
    /// The title is trimmed; a blank title is rejected and nothing is appended.
    pub fn add(&mut self, title: &str, priority: Priority) -> Result<Task, StoreError> {
        debug!(%priority, "add: called");
        let title = title.trim();
        if title.is_empty() {
            debug!("add: empty title rejected");
            return Err(StoreError::EmptyTitle);
        }

        let task = Task::new(title.to_string(), priority);
        debug!(id = %task.id(), "add: appended");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flip `completed` on a task, returning the new value
    pub fn toggle_complete(&mut self, id: TaskId) -> Result<bool, StoreError> {
        debug!(%id, "toggle_complete: called");
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(task.toggle())
    }

    /// Remove a task, returning it if it was present
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        debug!(%id, "delete: called");
        let index = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.tasks.iter().filter(|t| t.is_completed()).count(),
            total: self.tasks.len(),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolve a user reference to a task id
    ///
    /// A reference is either a 1-based position in display order or an id
    /// prefix. Position wins when the reference is a plain number in range.
    pub fn resolve(&self, reference: &str) -> Result<TaskId, StoreError> {
        debug!(%reference, "resolve: called");
        let reference = reference.trim();

        if let Ok(position) = reference.parse::<usize>()
            && position >= 1
            && let Some(task) = self.tasks.get(position - 1)
        {
            debug!(position, "resolve: matched by position");
            return Ok(task.id());
        }

        let candidates: Vec<TaskId> = self
            .tasks
            .iter()
            .map(|t| t.id())
            .filter(|id| id.matches(reference))
            .collect();

        match candidates.as_slice() {
            [] => Err(StoreError::NotFound(reference.to_string())),
            [id] => Ok(*id),
            _ => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                candidates,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_appends() {
        let mut store = TaskStore::new();
        let task = store.add("  Buy milk  ", Priority::Low).unwrap();

        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.priority(), Priority::Low);
        assert!(!task.is_completed());
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0], task);
    }

    #[test]
    fn test_add_rejects_blank_titles() {
        let mut store = TaskStore::new();
        assert_eq!(store.add("", Priority::Medium), Err(StoreError::EmptyTitle));
        assert_eq!(store.add("   ", Priority::High), Err(StoreError::EmptyTitle));
        assert_eq!(store.add("\t\n", Priority::Low), Err(StoreError::EmptyTitle));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let mut store = TaskStore::new();
        store.add("first", Priority::High).unwrap();
        store.add("second", Priority::Low).unwrap();
        store.add("third", Priority::Medium).unwrap();

        let titles: Vec<&str> = store.tasks().iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut store = TaskStore::new();
        let id = store.add("Walk dog", Priority::Medium).unwrap().id();

        assert_eq!(store.toggle_complete(id), Ok(true));
        assert!(store.get(id).unwrap().is_completed());
        assert_eq!(store.toggle_complete(id), Ok(false));
        assert!(!store.get(id).unwrap().is_completed());
    }

    #[test]
    fn test_toggle_missing_is_not_found() {
        let mut store = TaskStore::new();
        store.add("Walk dog", Priority::Medium).unwrap();
        let missing = TaskId::new();

        assert!(matches!(store.toggle_complete(missing), Err(StoreError::NotFound(_))));
        assert_eq!(store.progress(), Progress { completed: 0, total: 1 });
    }

    #[test]
    fn test_delete_twice_is_safe() {
        let mut store = TaskStore::new();
        let id = store.add("Call mom", Priority::High).unwrap().id();
        store.add("Keep me", Priority::Low).unwrap();

        let removed = store.delete(id).unwrap();
        assert_eq!(removed.title(), "Call mom");
        assert!(store.delete(id).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title(), "Keep me");
    }

    #[test]
    fn test_progress() {
        let mut store = TaskStore::new();
        assert_eq!(store.progress(), Progress { completed: 0, total: 0 });
        assert_eq!(store.progress().percent(), 0);

        let a = store.add("a", Priority::Low).unwrap().id();
        store.add("b", Priority::Low).unwrap();
        store.add("c", Priority::Low).unwrap();
        store.toggle_complete(a).unwrap();

        assert_eq!(store.progress(), Progress { completed: 1, total: 3 });
        assert_eq!(store.progress().percent(), 33);
    }

    #[test]
    fn test_resolve_by_position() {
        let mut store = TaskStore::new();
        let a = store.add("a", Priority::Low).unwrap().id();
        let b = store.add("b", Priority::Low).unwrap().id();

        assert_eq!(store.resolve("1"), Ok(a));
        assert_eq!(store.resolve(" 2 "), Ok(b));
        assert!(matches!(store.resolve("3"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_resolve_by_prefix() {
        let mut store = TaskStore::new();
        let task = store.add("a", Priority::Low).unwrap();

        assert_eq!(store.resolve(&task.id().to_string()), Ok(task.id()));
        assert_eq!(store.resolve(&task.id().short()), Ok(task.id()));
        assert!(matches!(store.resolve("zzzz"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let mut store = TaskStore::new();
        store.add("a", Priority::Low).unwrap();
        store.add("b", Priority::Low).unwrap();

        // Every v7 id minted today starts with '0'; "0" is never a valid position
        match store.resolve("0") {
            Err(StoreError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("Expected Ambiguous, got {:?}", other),
        }
    }
}
