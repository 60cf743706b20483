// Test doubles for the infrastructure traits
//
// Used by unit tests and the integration suite to observe what the offer
// sequencer delivered without touching Expo or real connections.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domains::auth::JwtService;
use crate::kernel::traits::{BasePushNotificationService, BaseSessionDirectory};
use crate::kernel::ServerDeps;

// =============================================================================
// Recording Push Service
// =============================================================================

/// A push notification captured by the recording service
#[derive(Debug, Clone)]
pub struct PushCall {
    pub push_token: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// Push service that records every call instead of hitting Expo
#[derive(Default)]
pub struct RecordingPushService {
    calls: Mutex<Vec<PushCall>>,
    fail: Mutex<bool>,
}

impl RecordingPushService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends return an error (delivery-failure paths)
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<PushCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePushNotificationService for RecordingPushService {
    async fn send_notification(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(PushCall {
            push_token: push_token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
        });

        if *self.fail.lock().unwrap() {
            anyhow::bail!("simulated push failure");
        }
        Ok(())
    }
}

// =============================================================================
// Fake Session Directory
// =============================================================================

/// A live emission captured by the fake directory
#[derive(Debug, Clone)]
pub struct EmitCall {
    pub path: String,
    pub user_id: Uuid,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Session directory backed by an in-memory set of "connected" users
#[derive(Default)]
pub struct FakeSessionDirectory {
    connected: Mutex<HashSet<(String, Uuid)>>,
    emitted: Mutex<Vec<EmitCall>>,
}

impl FakeSessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as having a live connection within a scope path
    pub fn connect(&self, path: &str, user_id: Uuid) {
        self.connected
            .lock()
            .unwrap()
            .insert((path.to_string(), user_id));
    }

    pub fn disconnect(&self, path: &str, user_id: Uuid) {
        self.connected
            .lock()
            .unwrap()
            .remove(&(path.to_string(), user_id));
    }

    pub fn emitted(&self) -> Vec<EmitCall> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseSessionDirectory for FakeSessionDirectory {
    async fn emit(
        &self,
        path: &str,
        user_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> bool {
        let connected = self
            .connected
            .lock()
            .unwrap()
            .contains(&(path.to_string(), user_id));

        if connected {
            self.emitted.lock().unwrap().push(EmitCall {
                path: path.to_string(),
                user_id,
                event: event.to_string(),
                payload,
            });
        }
        connected
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of ServerDeps wired to doubles, with handles kept for assertions
pub struct TestDependencies {
    pub deps: ServerDeps,
    pub push: Arc<RecordingPushService>,
    pub sessions: Arc<FakeSessionDirectory>,
}

impl TestDependencies {
    pub fn new(db_pool: PgPool) -> Self {
        let push = Arc::new(RecordingPushService::new());
        let sessions = Arc::new(FakeSessionDirectory::new());
        let jwt_service = Arc::new(JwtService::new("test_secret", "test_issuer".to_string()));

        let deps = ServerDeps::new(db_pool, push.clone(), sessions.clone(), jwt_service);

        Self {
            deps,
            push,
            sessions,
        }
    }
}
