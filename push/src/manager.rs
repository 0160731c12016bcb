use crate::connection::{MemberId, SessionId, SessionRegistry};
use crate::message::OutboundEvent;
use axum::extract::ws::Message;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct Manager {
    registry: Arc<SessionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    /// Join a member's group with a new session and return its unique ID
    pub fn join(&self, member_id: MemberId, sender: UnboundedSender<Message>) -> SessionId {
        let session_id = self.registry.register(member_id, sender);
        info!("Live session joined");
        session_id
    }

    /// Leave by session ID; safe to call more than once
    pub fn leave(&self, session_id: &SessionId) {
        info!("Live session leaving");
        self.registry.unregister(session_id);
    }

    /// Number of live sessions across all members.
    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }

    /// Publish an event to every session of one member. Returns the number
    /// of sessions the event was delivered to; zero sessions is a silent
    /// success.
    pub fn publish(&self, member_id: &str, event: OutboundEvent) -> usize {
        let Some(message) = event.into_message() else {
            error!("Failed to serialize outbound event; dropping");
            return 0;
        };

        self.registry.send_to_member(member_id, message)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn publish_reaches_only_the_target_member() {
        let manager = Manager::new();
        let (tx_target, mut rx_target) = mpsc::unbounded_channel();
        let (tx_other, mut rx_other) = mpsc::unbounded_channel();

        manager.join("SPC-20240915-a1b2c3".to_owned(), tx_target);
        manager.join("SPC-20240915-d4e5f6".to_owned(), tx_other);

        let delivered = manager.publish(
            "SPC-20240915-a1b2c3",
            OutboundEvent::Notification {
                data: json!({"id": "n1"}),
            },
        );

        assert_eq!(delivered, 1);
        assert!(rx_target.recv().await.is_some());
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_after_leave_delivers_nothing() {
        let manager = Manager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let session_id = manager.join("SPC-20240915-a1b2c3".to_owned(), tx);
        assert_eq!(manager.session_count(), 1);

        manager.leave(&session_id);
        assert_eq!(manager.session_count(), 0);

        let delivered = manager.publish("SPC-20240915-a1b2c3", OutboundEvent::Pong);

        assert_eq!(delivered, 0);
    }
}
