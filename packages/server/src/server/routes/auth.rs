//! Login and logout endpoints.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::domains::auth::verify_password;
use crate::domains::users::{Device, User, UserData};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserData,
    pub access_token: String,
}

/// POST /api/v1/login
///
/// Email + password login for customers and partners. Admin accounts cannot
/// log in here. An account with no local password (social sign-in) gets a
/// distinct message so the client can route the user to the right flow.
pub async fn login_handler(
    Extension(state): Extension<AxumAppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = User::find_by_email_non_admin(&body.email, &state.db_pool)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let Some(hash) = &user.password_hash else {
        return Err(ApiError::BadRequest(
            "El email fue registrado de otra forma, intente con otra opción.".to_string(),
        ));
    };

    if !verify_password(&body.password, hash) {
        warn!(email = %body.email, "Login with wrong credentials");
        return Err(ApiError::Unauthorized);
    }

    let access_token = state
        .jwt_service
        .create_token(user.id, user.role.clone())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: user.into(),
        access_token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub device_token: Option<String>,
}

/// POST /api/v1/logout
///
/// Removes the caller's device registration so pushes stop. Best-effort:
/// a missing device row is still a successful logout.
pub async fn logout_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(token) = &body.device_token {
        let user_id = auth.as_ref().map(|Extension(u)| u.user_id);
        let removed = Device::remove(user_id, token, &state.db_pool).await?;
        info!(removed, "Logout removed device registration(s)");
    }

    Ok(Json(json!({ "success": true })))
}
