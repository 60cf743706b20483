//! Favr listing and offer acceptance endpoints.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::common::pagination::{PageParams, Paginated};
use crate::domains::favrs::Favr;
use crate::domains::offers::{sequencer, Offer};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;
use crate::server::routes::ApiError;

/// GET /api/v1/favrs?page=&per_page=
///
/// The authenticated user's favrs, newest first.
pub async fn list_favrs_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Favr>>, ApiError> {
    let Extension(auth) = auth.ok_or(ApiError::Unauthorized)?;

    let validated = params.validate();
    let (results, total) =
        Favr::find_page_for_user(auth.user_id, &validated, &state.db_pool).await?;

    Ok(Json(Paginated::new(results, total, &validated)))
}

/// POST /api/v1/favrs/:favr_id/accept
///
/// The authenticated partner accepts their offer for this favr. The accept
/// is a single atomic conditional update; losing the race returns 409. When
/// the accept does not go through, the sequencer gets a chance to re-arm a
/// parked offer for the favr.
pub async fn accept_offer_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(favr_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Extension(auth) = auth.ok_or(ApiError::Unauthorized)?;

    let offer = Offer::find_for_partner(favr_id, auth.user_id, &state.db_pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    match Offer::accept(offer.id, &state.db_pool).await? {
        Some(accepted) => {
            info!(
                offer_id = %accepted.id,
                favr_id = %favr_id,
                partner_id = %auth.user_id,
                "Offer accepted"
            );
            Ok(Json(json!({ "accepted": true, "offer_id": accepted.id })))
        }
        None => {
            // Someone else won, or the offer was in the wrong state. Give the
            // sequencer a chance to re-arm a parked candidate.
            sequencer::on_accepted(favr_id, &state.deps).await?;
            Err(ApiError::Conflict(
                "Offer can no longer be accepted".to_string(),
            ))
        }
    }
}
