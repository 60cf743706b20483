//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::common::utils::ExpoClient;
use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::kernel::{ServerDeps, SessionHub};
use crate::server::routes::{
    auth::{login_handler, logout_handler},
    devices::register_device_handler,
    favrs::{accept_offer_handler, list_favrs_handler},
    health::health_handler,
    notifications::list_notifications_handler,
    stream::stream_handler,
    users::get_user_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
    pub session_hub: Arc<SessionHub>,
}

/// Build the Axum application router.
///
/// Returns (Router, Arc<ServerDeps>) - deps are also needed by restart
/// recovery and the scheduled dispatch tick.
pub fn build_app(pool: PgPool, config: &Config) -> (Router, Arc<ServerDeps>) {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
    ));

    // Live session registry; doubles as the sequencer's session directory
    let session_hub = Arc::new(SessionHub::new());

    let push_service = Arc::new(ExpoClient::new(config.expo_access_token.clone()));

    let deps = Arc::new(ServerDeps::new(
        pool.clone(),
        push_service,
        session_hub.clone(),
        jwt_service.clone(),
    ));

    let app_state = AxumAppState {
        db_pool: pool,
        deps: deps.clone(),
        jwt_service: jwt_service.clone(),
        session_hub,
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting: 10 req/sec base with bursts of 20 per client IP,
    // protects login from credential stuffing
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let jwt_service_for_middleware = jwt_service;

    let api = Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/user", get(get_user_handler))
        .route("/devices", post(register_device_handler))
        .route("/favrs", get(list_favrs_handler))
        .route("/favrs/:favr_id/accept", post(accept_offer_handler))
        .route("/notifications", get(list_notifications_handler))
        .route("/streams/:scope", get(stream_handler))
        .layer(rate_limit_layer);

    let app = Router::new()
        .nest("/api/v1", api)
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            crate::server::middleware::jwt_auth_middleware(
                jwt_service_for_middleware.clone(),
                req,
                next,
            )
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (app, deps)
}
