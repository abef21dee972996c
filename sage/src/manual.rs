//! Manual task composer: a title field plus a priority selector

use taskstore::{Priority, Task, TaskStore};
use tracing::{debug, info};

use crate::notify::{Notification, NotificationSink};

/// Title text and priority selection waiting to become a task
#[derive(Debug, Clone, Default)]
pub struct ManualComposer {
    title: String,
    priority: Priority,
}

impl ManualComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        debug!(%priority, "set_priority: called");
        self.priority = priority;
    }

    /// Add the current title as a task
    ///
    /// A blank title does nothing at all. On success the title is cleared and
    /// the priority selection is kept.
    pub fn submit(&mut self, store: &mut TaskStore, sink: &mut dyn NotificationSink) -> Option<Task> {
        debug!(title_len = self.title.len(), "submit: called");
        match store.add(&self.title, self.priority) {
            Ok(task) => {
                info!(id = %task.id(), priority = %task.priority(), "submit: task added");
                self.title.clear();
                sink.notify(Notification::task_added());
                Some(task)
            }
            Err(e) => {
                debug!(error = %e, "submit: ignored");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;

    #[test]
    fn test_defaults() {
        let composer = ManualComposer::new();
        assert_eq!(composer.title(), "");
        assert_eq!(composer.priority(), Priority::Medium);
    }

    #[test]
    fn test_submit_adds_trimmed_task() {
        let mut composer = ManualComposer::new();
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        composer.set_title("  Water the plants ");
        composer.set_priority(Priority::High);
        let task = composer.submit(&mut store, &mut sink).unwrap();

        assert_eq!(task.title(), "Water the plants");
        assert_eq!(task.priority(), Priority::High);
        assert!(!task.is_completed());
        assert_eq!(store.len(), 1);

        assert_eq!(composer.title(), "");
        assert_eq!(composer.priority(), Priority::High);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].kind, NotificationKind::Success);
        assert_eq!(sink[0].title, "Task added");
    }

    #[test]
    fn test_blank_title_is_silent() {
        let mut composer = ManualComposer::new();
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        for title in ["", "   ", "\t\n"] {
            composer.set_title(title);
            assert!(composer.submit(&mut store, &mut sink).is_none());
        }

        assert!(store.is_empty());
        assert!(sink.is_empty());
    }
}
