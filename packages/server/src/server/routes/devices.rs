use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::domains::users::Device;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_token: String,
}

/// POST /api/v1/devices
///
/// Registers a push device token for the authenticated user. The newest
/// token becomes the push target.
pub async fn register_device_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<RegisterDeviceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Extension(auth) = auth.ok_or(ApiError::Unauthorized)?;

    if body.device_token.trim().is_empty() {
        return Err(ApiError::BadRequest("device_token must not be empty".to_string()));
    }

    let device = Device::register(auth.user_id, &body.device_token, &state.db_pool).await?;
    info!(user_id = %auth.user_id, device_id = %device.id, "Device registered");

    Ok(Json(json!({ "id": device.id })))
}
