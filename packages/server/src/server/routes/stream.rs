//! SSE live-session endpoint.
//!
//! GET /api/v1/streams/:scope?token=JWT
//!
//! Registers the authenticated user as connected within a scope path on the
//! SessionHub and forwards emitted events as SSE. While this stream is open
//! the offer sequencer delivers offers here instead of falling back to push.
//!
//! Auth strategy: JWT passed as `?token=` query param (EventSource can't set
//! custom headers), with the Authorization header as fallback.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use crate::server::app::AxumAppState;

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
}

/// SSE session handler.
pub async fn stream_handler(
    Extension(state): Extension<AxumAppState>,
    Path(scope): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let token = query
        .token
        .or_else(|| extract_bearer_token(&headers))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state
        .jwt_service
        .verify_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Session routes are stored with a leading slash ("/partners")
    let path = format!("/{}", scope.trim_start_matches('/'));
    let rx = state.session_hub.connect(&path, claims.user_id).await;

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = BroadcastStream::new(rx).filter_map(|result| async {
        match result {
            Ok(value) => {
                let event_name = value
                    .get("event")
                    .and_then(|e| e.as_str())
                    .unwrap_or("message")
                    .to_string();
                Event::default()
                    .event(event_name)
                    .json_data(value.get("payload").cloned().unwrap_or_default())
                    .ok()
                    .map(Ok)
            }
            // Lagged receiver: drop missed messages, keep the stream alive
            Err(_) => None,
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(KeepAlive::default()))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    Some(auth.strip_prefix("Bearer ").unwrap_or(auth).to_string())
}
