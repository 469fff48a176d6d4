//! Notification sink for transient user-facing messages.
//!
//! The sync client reports every outcome here: authority messages for
//! start/reset, errors from any request, and session completion.
//!
//! - [`ConsoleNotifier`] prints toasts to the terminal
//! - [`MockNotifier`] records notifications for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::TimerMode;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A single toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    /// Creates a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Creates an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Creates the notification for a finished session.
    ///
    /// `finished` is the mode that just ran out.
    pub fn session_complete(finished: TimerMode) -> Self {
        match finished {
            TimerMode::Work => Self::success(WORK_COMPLETE_MESSAGE),
            TimerMode::Break => Self::success(BREAK_COMPLETE_MESSAGE),
        }
    }

    /// Returns true if this is an error notification.
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Shown when a work session runs out.
pub const WORK_COMPLETE_MESSAGE: &str = "作業完了！休憩の時間です。";

/// Shown when a break runs out.
pub const BREAK_COMPLETE_MESSAGE: &str = "休憩完了！次のサイクルを始めましょう。";

/// Receiver of user-facing notifications.
///
/// Delivery is fire-and-forget; a sink never reports failure back to the
/// timer logic.
pub trait NotificationSink: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

// ============================================================================
// ConsoleNotifier
// ============================================================================

/// Prints notifications to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("\n* {}", notification.message),
            NotificationLevel::Error => eprintln!("\nエラー: {}", notification.message),
        }
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Records notifications for assertions.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<Notification>>,
    muted: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops incoming notifications while muted.
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    /// Number of recorded notifications with exactly this message.
    #[must_use]
    pub fn count_message(&self, message: &str) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.message == message)
            .count()
    }

    /// Number of recorded error notifications.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.is_error())
            .count()
    }

    pub fn clear_recorded(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl NotificationSink for MockNotifier {
    fn notify(&self, notification: Notification) {
        if self.muted.load(Ordering::SeqCst) {
            return;
        }
        self.notifications.lock().unwrap().push(notification);
    }
}

impl<N: NotificationSink> NotificationSink for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_complete_messages() {
        assert_eq!(
            Notification::session_complete(TimerMode::Work).message,
            WORK_COMPLETE_MESSAGE
        );
        assert_eq!(
            Notification::session_complete(TimerMode::Break).message,
            BREAK_COMPLETE_MESSAGE
        );
        assert!(!Notification::session_complete(TimerMode::Work).is_error());
    }

    #[test]
    fn test_mock_notifier_records_in_order() {
        let mock = MockNotifier::new();

        mock.notify(Notification::success("開始"));
        mock.notify(Notification::error("失敗"));

        let notifications = mock.get_notifications();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0], Notification::success("開始"));
        assert_eq!(mock.error_count(), 1);
        assert_eq!(mock.count_message("失敗"), 1);
    }

    #[test]
    fn test_mock_notifier_muted() {
        let mock = MockNotifier::new();
        mock.set_muted(true);
        mock.notify(Notification::success("ignored"));
        assert_eq!(mock.notification_count(), 0);

        mock.set_muted(false);
        mock.notify(Notification::success("kept"));
        assert_eq!(mock.notification_count(), 1);

        mock.clear_recorded();
        assert_eq!(mock.notification_count(), 0);
    }

    #[test]
    fn test_console_notifier_does_not_panic() {
        ConsoleNotifier.notify(Notification::success("ok"));
        ConsoleNotifier.notify(Notification::error("ng"));
    }
}
