//! User-facing outcome notifications.

use log::debug;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// One human-readable outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }
}

/// Receiver of notifications, typically a toast/banner in the presentation layer.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends `notification` to `sink` and records a metadata-only log event.
pub(crate) fn emit(sink: &dyn NotificationSink, notification: Notification) {
    debug!(
        "event=notify module=service kind={}",
        notification.kind.as_str()
    );
    sink.notify(notification);
}

/// In-memory sink that keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all notifications received so far.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Removes and returns all notifications received so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.lock().iter().filter(|entry| entry.kind == kind).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::{emit, Notification, NotificationKind, NotificationLog};

    #[test]
    fn log_keeps_arrival_order_and_drains() {
        let log = NotificationLog::new();
        emit(&log, Notification::info("first"));
        emit(&log, Notification::error("second"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.count(NotificationKind::Error), 1);
        let drained = log.drain();
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].kind, NotificationKind::Error);
        assert!(log.is_empty());
    }
}
