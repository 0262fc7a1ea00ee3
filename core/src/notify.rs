//! Transient user-facing notifications ("toasts").
//!
//! The HTTP client reports every failed request here, and the user store
//! reports successful mutations. A UI drains a `ChannelNotifier` receiver;
//! headless callers use `LogNotifier`.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(target: "notice", "{}", notice.message),
            NoticeLevel::Error => tracing::warn!(target: "notice", "{}", notice.message),
        }
    }
}

/// Forwards notices to a channel for a UI to render.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Receiver gone means nobody is displaying notices anymore.
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice dropped, receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::success("user created"));
        notifier.notify(Notice::error("access denied"));

        assert_eq!(rx.try_recv().unwrap(), Notice::success("user created"));
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NoticeLevel::Error);
        assert_eq!(second.message, "access denied");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_notifier_survives_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::error("network error"));
    }
}
