//! Notification contract used by sessions, plus an in-memory toast queue.
//!
//! Titles and messages are message keys or content text; translating them
//! is up to the presentation layer.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoticeOptions {
    /// Auto-dismiss delay; `None` keeps the toast until dismissed.
    pub duration_ms: Option<u64>,
}

impl Default for NoticeOptions {
    fn default() -> Self {
        Self {
            duration_ms: Some(DEFAULT_DURATION_MS),
        }
    }
}

pub const DEFAULT_DURATION_MS: u64 = 3000;

/// Sink for user-facing notifications.
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: Option<&str>, opts: NoticeOptions);

    /// Replace whatever is currently shown.
    fn notify_single(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    );

    /// Fire at most once per `key` for this notifier's lifetime.
    fn notify_once(
        &mut self,
        key: &str,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: NoticeKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: Option<u64>,
}

/// Visible toasts, capped at `capacity` (two by default).
#[derive(Debug, Clone)]
pub struct ToastQueue {
    visible: Vec<Toast>,
    capacity: usize,
    fired_keys: HashSet<String>,
    next_id: u64,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_capacity(2)
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            visible: Vec::new(),
            capacity: capacity.max(1),
            fired_keys: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn visible(&self) -> &[Toast] {
        &self.visible
    }

    /// Timer callback; ids that are already gone are ignored.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.visible.len();
        self.visible.retain(|toast| toast.id != id);
        self.visible.len() != before
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }

    fn show(&mut self, kind: NoticeKind, title: &str, message: Option<&str>, opts: NoticeOptions) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.visible.len() >= self.capacity {
            self.visible.remove(0);
        }
        self.visible.push(Toast {
            id,
            kind,
            title: title.to_string(),
            message: message.map(str::to_string),
            duration_ms: opts.duration_ms,
        });
        id
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: Option<&str>, opts: NoticeOptions) {
        self.show(kind, title, message, opts);
    }

    fn notify_single(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    ) {
        self.visible.clear();
        self.show(kind, title, message, opts);
    }

    fn notify_once(
        &mut self,
        key: &str,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    ) {
        if self.fired_keys.insert(key.to_string()) {
            self.show(kind, title, message, opts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(queue: &ToastQueue) -> Vec<&str> {
        queue.visible().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn dual_slot_evicts_oldest() {
        let mut queue = ToastQueue::new();
        for title in ["a", "b", "c"] {
            queue.notify(NoticeKind::Info, title, None, NoticeOptions::default());
        }
        assert_eq!(titles(&queue), vec!["b", "c"]);
    }

    #[test]
    fn single_slot_replaces_everything() {
        let mut queue = ToastQueue::new();
        queue.notify(NoticeKind::Info, "a", None, NoticeOptions::default());
        queue.notify(NoticeKind::Info, "b", None, NoticeOptions::default());
        queue.notify_single(NoticeKind::Error, "c", Some("x"), NoticeOptions::default());
        assert_eq!(titles(&queue), vec!["c"]);
    }

    #[test]
    fn once_per_key() {
        let mut queue = ToastQueue::new();
        queue.notify_once("hint", NoticeKind::Info, "a", None, NoticeOptions::default());
        queue.clear();
        queue.notify_once("hint", NoticeKind::Info, "a", None, NoticeOptions::default());
        assert!(queue.visible().is_empty());
    }

    #[test]
    fn stale_dismiss_is_ignored() {
        let mut queue = ToastQueue::new();
        queue.notify_single(NoticeKind::Success, "first", None, NoticeOptions::default());
        let first = queue.visible()[0].id;
        queue.notify_single(NoticeKind::Success, "second", None, NoticeOptions::default());
        assert!(!queue.dismiss(first));
        assert_eq!(titles(&queue), vec!["second"]);
    }
}
