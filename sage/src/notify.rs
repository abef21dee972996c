//! User-facing notifications
//!
//! The pipeline reports outcomes through [`NotificationSink`]; how they are
//! shown is up to the front end.

use colored::Colorize;
use tracing::debug;

/// Whether a notification reports success or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Sent whenever a task lands in the store, by either composer
    pub fn task_added() -> Self {
        Self::success("Task added", "Your new task has been added successfully.")
    }
}

/// Receiver of user-facing notifications
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Prints notifications to stdout
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Render a notification as a single colored line
    pub fn render(notification: &Notification) -> String {
        match notification.kind {
            NotificationKind::Success => format!(
                "{} {} {}",
                "✓".green(),
                notification.title.green().bold(),
                notification.description
            ),
            NotificationKind::Error => format!(
                "{} {} {}",
                "✗".red(),
                notification.title.red().bold(),
                notification.description
            ),
        }
    }
}

impl NotificationSink for ConsoleNotifier {
    fn notify(&mut self, notification: Notification) {
        debug!(kind = ?notification.kind, title = %notification.title, "ConsoleNotifier::notify: called");
        println!("{}", Self::render(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Notification> = Vec::new();
        sink.notify(Notification::success("Task added", "ok"));
        sink.notify(Notification::error("Error", "bad"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind, NotificationKind::Success);
        assert_eq!(sink[1].kind, NotificationKind::Error);
    }

    #[test]
    fn test_render_contains_text() {
        colored::control::set_override(false);
        let line = ConsoleNotifier::render(&Notification::error("Error", "Failed to process"));
        assert_eq!(line, "✗ Error Failed to process");
    }
}
