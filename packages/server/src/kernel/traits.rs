// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The offer sequencer and route handlers depend on these rather than on
// concrete clients so tests can inject recording doubles.
//
// Naming convention: Base* for trait names

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

// =============================================================================
// Push Notification Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BasePushNotificationService: Send + Sync {
    /// Send a push notification to a device token. Fire-and-forget from the
    /// caller's perspective; no delivery confirmation is awaited.
    async fn send_notification(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()>;
}

// =============================================================================
// Session Directory Trait (Infrastructure - live connections)
// =============================================================================

/// Lookup and emission against live client connections.
///
/// Passed explicitly into the notification dispatcher instead of being read
/// from process-wide state, so the dispatcher is unit-testable with a fake
/// directory.
#[async_trait]
pub trait BaseSessionDirectory: Send + Sync {
    /// Emit an event to the given user's live connection within a scope path.
    ///
    /// Returns true if a live connection existed and the message was handed
    /// to it, false if the user has no connection in that scope.
    async fn emit(
        &self,
        path: &str,
        user_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> bool;

    /// Drop directory entries that no longer have a live connection.
    ///
    /// Called periodically by the scheduler. Directories without internal
    /// state to reclaim can keep the default no-op.
    async fn cleanup(&self) {}
}
