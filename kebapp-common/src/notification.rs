// File: kebapp-common/src/notification.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Friday 29 November 2024 @ 10:14:55
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use tokio::sync::mpsc;

use crate::debug;

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
    /// The user needs to do something before retrying.
    Warning,
    /// Informative message.
    Info,
}

/// A message meant for the investor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Text shown to the investor.
    pub message: String,
}

impl Notification {
    /// A success notification.
    #[must_use]
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    /// An error notification.
    #[must_use]
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// A warning notification.
    #[must_use]
    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }

    /// An informative notification.
    #[must_use]
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// Sending half of the notification channel.
///
/// Notifications are dropped silently once the receiving side is gone.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a new notification channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Push a notification.
    ///
    /// # Parameters
    /// * `notification` - The notification to send.
    pub fn notify(&self, notification: Notification) {
        debug!("notification: {:?}", notification);
        if self.sender.send(notification).is_err() {
            debug!("notification dropped: no receiver");
        }
    }
}
