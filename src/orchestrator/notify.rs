//! User notifications
//!
//! Transient messages (toasts) published on a broadcast channel. Publishing
//! with no subscribers is not an error.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

/// Notification texts
pub mod messages {
    pub const ALLOW_IN_WALLET: &str = "Allow the transaction on your wallet to proceed.";
    pub const APPROVAL_SUCCEEDED: &str = "Approval was successful! Proceeding with transfer...";
    pub const SWAP_SUCCEEDED: &str = "Token swap was successful!";
    pub const STAKE_SUCCEEDED: &str = "Tokens staked successfully!";
    pub const INSUFFICIENT_FUNDS: &str = "Insufficient funds";
    pub const APPROVAL_FAILED: &str = "Approval failed.";
    pub const TRANSFER_FAILED: &str = "Transfer failed.";
    pub const CONNECT_WALLET_FIRST: &str = "Please connect your wallet first";
    pub const GENERIC_ERROR: &str =
        "An error occurred while processing your request. Please try again!";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: &str) {
        self.publish(NotificationLevel::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.publish(NotificationLevel::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.publish(NotificationLevel::Error, message);
    }

    fn publish(&self, level: NotificationLevel, message: &str) {
        let notification = Notification {
            level,
            message: message.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        if self.tx.send(notification).is_err() {
            tracing::trace!(message = %message, "No notification subscribers");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.info(messages::ALLOW_IN_WALLET);
        notifier.error(messages::APPROVAL_FAILED);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Info);
        assert_eq!(first.message, messages::ALLOW_IN_WALLET);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.level, NotificationLevel::Error);
    }

    #[test]
    fn test_publish_without_subscribers() {
        Notifier::default().success(messages::SWAP_SUCCEEDED);
    }
}
