//! Connection registry: who is connected and which teams they follow

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::events::WsEvent;

type Sender = mpsc::UnboundedSender<String>;

#[derive(Debug, Default)]
struct RegistryInner {
    /// One connection per user; a new connection replaces the old one
    connections: HashMap<Uuid, Sender>,
    /// team id → subscribed user ids
    team_subscriptions: HashMap<Uuid, HashSet<Uuid>>,
}

/// Shared registry of live WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for a user. Replaces any previous connection,
    /// which closes the old socket once its sender is dropped.
    pub async fn connect(&self, user_id: Uuid, sender: Sender) {
        let mut inner = self.inner.write().await;
        if inner.connections.insert(user_id, sender).is_some() {
            tracing::debug!(%user_id, "replaced existing websocket connection");
        }
    }

    /// Remove a connection and all of its team subscriptions.
    pub async fn disconnect(&self, user_id: Uuid) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(&user_id);
        inner.team_subscriptions.retain(|_, users| {
            users.remove(&user_id);
            !users.is_empty()
        });
    }

    pub async fn subscribe(&self, user_id: Uuid, team_id: Uuid) {
        let mut inner = self.inner.write().await;
        inner
            .team_subscriptions
            .entry(team_id)
            .or_default()
            .insert(user_id);
    }

    pub async fn unsubscribe(&self, user_id: Uuid, team_id: Uuid) {
        let mut inner = self.inner.write().await;
        if let Some(users) = inner.team_subscriptions.get_mut(&team_id) {
            users.remove(&user_id);
            if users.is_empty() {
                inner.team_subscriptions.remove(&team_id);
            }
        }
    }

    /// Send to one user. Returns false if they are not connected.
    pub async fn send_to_user(&self, user_id: Uuid, payload: &str) -> bool {
        let inner = self.inner.read().await;
        match inner.connections.get(&user_id) {
            Some(sender) => sender.send(payload.to_string()).is_ok(),
            None => false,
        }
    }

    /// Route an event: team-scoped to subscribers, club-wide to everyone.
    pub async fn publish(&self, event: &WsEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize websocket event");
                return;
            }
        };

        let inner = self.inner.read().await;
        let mut delivered = 0usize;
        match event.team_id() {
            Some(team_id) => {
                if let Some(users) = inner.team_subscriptions.get(&team_id) {
                    for user_id in users {
                        if let Some(sender) = inner.connections.get(user_id) {
                            if sender.send(payload.clone()).is_ok() {
                                delivered += 1;
                            }
                        }
                    }
                }
            }
            None => {
                for sender in inner.connections.values() {
                    if sender.send(payload.clone()).is_ok() {
                        delivered += 1;
                    }
                }
            }
        }
        tracing::debug!(team_id = ?event.team_id(), delivered, "published websocket event");
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (Sender, mpsc::UnboundedReceiver<String>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn test_connect_and_send() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (tx, mut rx) = channel();

        registry.connect(user, tx).await;
        assert!(registry.send_to_user(user, "hello").await);
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));

        assert!(!registry.send_to_user(Uuid::new_v4(), "nope").await);
    }

    #[tokio::test]
    async fn test_team_scoped_publish_reaches_only_subscribers() {
        let registry = ConnectionRegistry::new();
        let team = Uuid::new_v4();
        let subscriber = Uuid::new_v4();
        let bystander = Uuid::new_v4();

        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.connect(subscriber, tx1).await;
        registry.connect(bystander, tx2).await;
        registry.subscribe(subscriber, team).await;

        let event = WsEvent::EventCreated {
            event_id: Uuid::new_v4(),
            team_id: Some(team),
            title: "Practice".to_string(),
        };
        registry.publish(&event).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_club_wide_publish_reaches_everyone() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.connect(Uuid::new_v4(), tx1).await;
        registry.connect(Uuid::new_v4(), tx2).await;

        let event = WsEvent::NewsPublished {
            news_id: Uuid::new_v4(),
            team_id: None,
            title: "Tryouts".to_string(),
        };
        registry.publish(&event).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_prunes_subscriptions() {
        let registry = ConnectionRegistry::new();
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (tx, _rx) = channel();

        registry.connect(user, tx).await;
        registry.subscribe(user, team).await;
        registry.disconnect(user).await;

        assert_eq!(registry.connection_count().await, 0);

        let event = WsEvent::EventCreated {
            event_id: Uuid::new_v4(),
            team_id: Some(team),
            title: "Practice".to_string(),
        };
        // Publishing to a pruned team must not panic or deliver anywhere.
        registry.publish(&event).await;
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let registry = ConnectionRegistry::new();
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (tx, mut rx) = channel();

        registry.connect(user, tx).await;
        registry.subscribe(user, team).await;
        registry.unsubscribe(user, team).await;

        let event = WsEvent::GameScheduled {
            game_id: Uuid::new_v4(),
            team_id: Some(team),
            opponent: "Rivals".to_string(),
        };
        registry.publish(&event).await;
        assert!(rx.try_recv().is_err());
    }
}
