//! Notifier that logs every notice and keeps the visible toasts.

use drill_core::{NoticeKind, NoticeOptions, Notifier, Toast, ToastQueue};

#[derive(Debug, Default)]
pub struct TracingNotifier {
    queue: ToastQueue,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> &[Toast] {
        self.queue.visible()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        self.queue.dismiss(id)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

fn log(kind: NoticeKind, title: &str, message: Option<&str>) {
    match kind {
        NoticeKind::Error | NoticeKind::Warning => {
            tracing::warn!(?kind, title, detail = message, "notice");
        }
        NoticeKind::Success | NoticeKind::Info => {
            tracing::debug!(?kind, title, detail = message, "notice");
        }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: Option<&str>, opts: NoticeOptions) {
        log(kind, title, message);
        self.queue.notify(kind, title, message, opts);
    }

    fn notify_single(
        &mut self,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    ) {
        log(kind, title, message);
        self.queue.notify_single(kind, title, message, opts);
    }

    fn notify_once(
        &mut self,
        key: &str,
        kind: NoticeKind,
        title: &str,
        message: Option<&str>,
        opts: NoticeOptions,
    ) {
        let before = self.queue.visible().last().map(|toast| toast.id);
        self.queue.notify_once(key, kind, title, message, opts);
        if self.queue.visible().last().map(|toast| toast.id) != before {
            log(kind, title, message);
        }
    }
}
