//! Notification dispatcher for offers.
//!
//! Delivery is "live" when the candidate has a connection reachable via the
//! offer's session route; otherwise a best-effort push notification goes to
//! the candidate's latest device. No delivery confirmation is awaited.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domains::favrs::FavrSummary;
use crate::domains::notifications::Notification;
use crate::domains::offers::models::Offer;
use crate::domains::users::Device;
use crate::kernel::ServerDeps;

/// Event action emitted on a live connection when an offer arrives
pub const ACTION_REQUEST_FAVR: &str = "request_favr";

/// Push payload type for new offers
pub const PUSH_TYPE_ADD_REQUEST: &str = "add_request";

/// Deliver an offer to its candidate partner.
///
/// Returns Ok(()) whether delivery was live, pushed, or skipped; only
/// unexpected store errors propagate. Push failures are logged and
/// swallowed.
pub async fn deliver_offer(offer: &Offer, deps: &ServerDeps) -> Result<()> {
    // Favr summary with category and requester display fields
    let Some(favr) = FavrSummary::find(offer.favr_id, &deps.db_pool).await? else {
        debug!(favr_id = %offer.favr_id, "Favr no longer exists, nothing to deliver");
        return Ok(());
    };

    let delivered_live = deps
        .sessions
        .emit(
            &offer.socket_path,
            offer.partner_id,
            &offer.socket_emitter,
            json!({
                "action": ACTION_REQUEST_FAVR,
                "data": favr,
            }),
        )
        .await;

    if delivered_live {
        info!(
            favr_id = %offer.favr_id,
            partner_id = %offer.partner_id,
            "Offer delivered over live connection"
        );
        return Ok(());
    }

    // Push fallback
    let title = "Nuevo favor";
    let body = format!("La categoria {} tiene un nuevo favor", favr.category_name);
    let data = json!({
        "type": PUSH_TYPE_ADD_REQUEST,
        "favr_id": offer.favr_id.to_string(),
    });

    Notification::insert(
        offer.partner_id,
        title,
        &body,
        PUSH_TYPE_ADD_REQUEST,
        data.clone(),
        &deps.db_pool,
    )
    .await?;

    match Device::latest_for_user(offer.partner_id, &deps.db_pool).await? {
        Some(device) => {
            // Fire-and-forget: a failed push must not stall the sequencer
            if let Err(e) = deps
                .push_service
                .send_notification(&device.device_token, title, &body, data)
                .await
            {
                warn!(
                    partner_id = %offer.partner_id,
                    "Push delivery failed (swallowed): {}",
                    e
                );
            }
        }
        None => {
            debug!(partner_id = %offer.partner_id, "No registered device, push skipped");
        }
    }

    Ok(())
}
