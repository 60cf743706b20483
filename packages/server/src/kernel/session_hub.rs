//! In-process registry of live client connections.
//!
//! Connections are keyed by (scope path, user id). A user "connects" by
//! subscribing (the SSE endpoint does this) and stays addressable while at
//! least one receiver is alive. Producers emit JSON events at a specific
//! user; emission to a user with no live receiver reports not-delivered so
//! the caller can fall back to a push notification.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::kernel::traits::BaseSessionDirectory;

/// Thread-safe, cloneable session registry.
#[derive(Clone)]
pub struct SessionHub {
    channels: Arc<RwLock<HashMap<(String, Uuid), broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl SessionHub {
    /// Create a new SessionHub with default capacity (64 messages per session).
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Register a live connection for a user within a scope path.
    ///
    /// The user counts as connected until every receiver returned from this
    /// call has been dropped and `cleanup` has run.
    pub async fn connect(
        &self,
        path: &str,
        user_id: Uuid,
    ) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry((path.to_string(), user_id))
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Remove sessions with zero receivers.
    ///
    /// The SSE endpoint cannot observe its own disconnects, so dead entries
    /// linger until this runs; the scheduler calls it on an interval.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSessionDirectory for SessionHub {
    async fn emit(
        &self,
        path: &str,
        user_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> bool {
        let channels = self.channels.read().await;
        match channels.get(&(path.to_string(), user_id)) {
            Some(tx) if tx.receiver_count() > 0 => {
                let envelope = serde_json::json!({
                    "event": event,
                    "payload": payload,
                });
                tx.send(envelope).is_ok()
            }
            _ => false,
        }
    }

    async fn cleanup(&self) {
        SessionHub::cleanup(self).await;
    }
}
