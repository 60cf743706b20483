//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to the offer sequencer, scheduled
//! tasks and route handlers. External services sit behind trait objects so
//! tests can inject doubles.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::traits::{BasePushNotificationService, BaseSessionDirectory};

/// Server dependencies accessible to domain logic
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Push delivery for candidates without a live connection
    pub push_service: Arc<dyn BasePushNotificationService>,
    /// Directory of live client connections, keyed by (scope path, user id)
    pub sessions: Arc<dyn BaseSessionDirectory>,
    /// JWT service for token creation and verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        push_service: Arc<dyn BasePushNotificationService>,
        sessions: Arc<dyn BaseSessionDirectory>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db_pool,
            push_service,
            sessions,
            jwt_service,
        }
    }
}
