//! User-facing notification sink.
//!
//! Fire-and-forget, best-effort: the presenting layer shows a transient
//! toast and nothing blocks on delivery. Timer failures surface here and
//! nowhere else.

use parking_lot::Mutex;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A single emitted notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// Notification sink consumed by controllers.
pub trait Notify: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Routes notices to the tracing log. The CLI front end.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success => tracing::info!("{message}"),
            NoticeKind::Error => tracing::error!("{message}"),
        }
    }
}

/// Collects notices in memory. Used by tests and embedding UIs that render
/// their own toasts.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notify for MemoryNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.notices.lock().push(Notice {
            message: message.to_string(),
            kind,
        });
    }
}

impl<T: Notify> Notify for std::sync::Arc<T> {
    fn notify(&self, message: &str, kind: NoticeKind) {
        (**self).notify(message, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify("saved", NoticeKind::Success);
        notifier.notify("failed to stop timer", NoticeKind::Error);

        let notices = notifier.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[1].message, "failed to stop timer");

        notifier.clear();
        assert!(notifier.notices().is_empty());
    }
}
