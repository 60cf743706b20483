use axum::{extract::Extension, Json};

use crate::domains::users::{User, UserData};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

/// GET /api/v1/user
///
/// The authenticated user's own profile.
pub async fn get_user_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<UserData>, ApiError> {
    let Extension(auth) = auth.ok_or(ApiError::Unauthorized)?;

    let user = User::find_by_id(auth.user_id, &state.db_pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user.into()))
}
