use axum::{
    extract::{Extension, Query},
    Json,
};

use crate::common::pagination::{PageParams, Paginated};
use crate::domains::notifications::Notification;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

/// GET /api/v1/notifications?page=&per_page=
///
/// The authenticated user's notification feed, newest first.
pub async fn list_notifications_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Notification>>, ApiError> {
    let Extension(auth) = auth.ok_or(ApiError::Unauthorized)?;

    let validated = params.validate();
    let (results, total) =
        Notification::find_page_for_user(auth.user_id, &validated, &state.db_pool).await?;

    Ok(Json(Paginated::new(results, total, &validated)))
}
