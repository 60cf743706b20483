//! Offer dispatch sequencer.
//!
//! For a single favr, offers go out to candidate partners one at a time:
//! exactly one offer sits in `next_to_send` (the active candidate), the rest
//! of the queue waits in `pending`. Advancing delivers to the active
//! candidate, marks that offer `sended` and promotes the oldest pending
//! offer into the active slot. Once any offer reaches `accepted` the
//! sequencer stops touching the favr.
//!
//! All state transitions are single guarded UPDATE statements (see
//! `models::offer`), so two near-simultaneous acceptance events cannot both
//! win. Absence of an expected row is "nothing to do", never an error.

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domains::offers::models::{Offer, OfferStatus};
use crate::domains::offers::notify;
use crate::kernel::ServerDeps;

/// Advance the queue past the given active offer.
///
/// Delivers the offer to its candidate, marks it `sended` and promotes the
/// next pending candidate. No-op when the offer is not the active one or the
/// favr already has an accepted offer.
pub async fn advance(offer: &Offer, deps: &ServerDeps) -> Result<()> {
    if offer.status != OfferStatus::NextToSend {
        debug!(
            offer_id = %offer.id,
            status = ?offer.status,
            "Advance called on non-active offer, ignoring"
        );
        return Ok(());
    }

    // Cheap early exit; the mark_sended statement re-checks atomically.
    if Offer::find_by_favr_and_status(offer.favr_id, OfferStatus::Accepted, &deps.db_pool)
        .await?
        .is_some()
    {
        info!(favr_id = %offer.favr_id, "Favr already accepted, not dispatching");
        return Ok(());
    }

    notify::deliver_offer(offer, deps).await?;

    let marked = Offer::mark_sended(offer.id, offer.favr_id, &deps.db_pool).await?;
    if !marked {
        // Lost a race to an acceptance or a concurrent dispatch; either way
        // the queue is no longer ours to move.
        debug!(offer_id = %offer.id, "Offer no longer active, leaving queue untouched");
        return Ok(());
    }

    info!(
        offer_id = %offer.id,
        favr_id = %offer.favr_id,
        partner_id = %offer.partner_id,
        "Offer marked sended"
    );

    if let Some(next) = Offer::promote_oldest_pending(offer.favr_id, &deps.db_pool).await? {
        info!(
            offer_id = %next.id,
            favr_id = %next.favr_id,
            partner_id = %next.partner_id,
            "Promoted next candidate"
        );
    } else {
        info!(favr_id = %offer.favr_id, "Candidate queue exhausted");
    }

    Ok(())
}

/// Dispatch the active offer for a favr, if one exists.
///
/// Re-entry point used by acceptance/rejection events, the cron tick and
/// restart recovery.
pub async fn dispatch_next(favr_id: Uuid, deps: &ServerDeps) -> Result<()> {
    match Offer::find_by_favr_and_status(favr_id, OfferStatus::NextToSend, &deps.db_pool).await? {
        Some(offer) => advance(&offer, deps).await,
        None => {
            debug!(favr_id = %favr_id, "No active offer to dispatch");
            Ok(())
        }
    }
}

/// Re-arm sequencing for a favr whose acceptance fell through.
///
/// If no offer is accepted but one is parked in `next_to_send_pending`,
/// promote it to the active slot and dispatch it.
pub async fn on_accepted(favr_id: Uuid, deps: &ServerDeps) -> Result<()> {
    if Offer::find_by_favr_and_status(favr_id, OfferStatus::Accepted, &deps.db_pool)
        .await?
        .is_some()
    {
        debug!(favr_id = %favr_id, "Favr has an accepted offer, nothing to re-arm");
        return Ok(());
    }

    if let Some(offer) = Offer::promote_next_to_send_pending(favr_id, &deps.db_pool).await? {
        info!(
            offer_id = %offer.id,
            favr_id = %favr_id,
            "Re-armed parked offer, dispatching"
        );
        dispatch_next(favr_id, deps).await?;
    }

    Ok(())
}

/// Restart recovery: replay sequencing for every in-flight offer.
///
/// Scans all offers in `next_to_send` or `next_to_send_pending` and re-runs
/// the matching entry point per favr. Sequential sweep; assumes a single
/// running instance.
pub async fn recover_in_flight(deps: &ServerDeps) -> Result<()> {
    info!("Recovering in-flight offer dispatch state");

    let offers = Offer::find_in_flight(&deps.db_pool).await?;

    if offers.is_empty() {
        info!("No in-flight offers to recover");
        return Ok(());
    }

    info!("Found {} in-flight offer(s)", offers.len());

    for offer in offers {
        match offer.status {
            OfferStatus::NextToSendPending => on_accepted(offer.favr_id, deps).await?,
            OfferStatus::NextToSend => dispatch_next(offer.favr_id, deps).await?,
            _ => {}
        }
    }

    Ok(())
}
