//! Integration tests for the offer dispatch sequencer.
//!
//! Covers the one-at-a-time delivery cycle: exactly one active candidate per
//! favr, FIFO promotion, acceptance stopping the queue, live-vs-push
//! delivery, and restart recovery.

mod common;

use crate::common::{
    create_category, create_device, create_favr, create_offer, create_offer_at, create_user,
    minutes_ago, TestHarness,
};
use favr_core::domains::offers::models::{Offer, OfferStatus};
use favr_core::domains::offers::sequencer;
use test_context::test_context;
use uuid::Uuid;

struct QueueSetup {
    favr_id: Uuid,
    category_id: Uuid,
    /// Partner holding the active (`next_to_send`) offer
    active: Offer,
    /// Pending offers, oldest first
    pending: Vec<Offer>,
}

/// A favr with one active offer and `pending_count` pending offers behind it,
/// with created_at spaced so FIFO order is unambiguous.
async fn setup_queue(ctx: &TestHarness, pending_count: usize) -> QueueSetup {
    let requester = create_user("customer", &ctx.db_pool).await.unwrap();
    let category = create_category(&ctx.db_pool).await.unwrap();
    let favr = create_favr(requester.id, category.id, &ctx.db_pool)
        .await
        .unwrap();

    let partner = create_user("partner", &ctx.db_pool).await.unwrap();
    let active = create_offer_at(
        favr.id,
        partner.id,
        category.id,
        OfferStatus::NextToSend,
        minutes_ago(60),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let mut pending = Vec::new();
    for i in 0..pending_count {
        let p = create_user("partner", &ctx.db_pool).await.unwrap();
        let offer = create_offer_at(
            favr.id,
            p.id,
            category.id,
            OfferStatus::Pending,
            minutes_ago(50 - i as i64 * 10),
            &ctx.db_pool,
        )
        .await
        .unwrap();
        pending.push(offer);
    }

    QueueSetup {
        favr_id: favr.id,
        category_id: category.id,
        active,
        pending,
    }
}

async fn status_of(offer_id: Uuid, ctx: &TestHarness) -> OfferStatus {
    Offer::find_by_id(offer_id, &ctx.db_pool)
        .await
        .unwrap()
        .expect("offer exists")
        .status
}

// =============================================================================
// Advance cycle
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn advance_marks_sended_and_promotes_oldest_pending(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 2).await;
    let td = ctx.test_deps();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    assert_eq!(status_of(setup.active.id, ctx).await, OfferStatus::Sended);
    // Oldest pending moved into the active slot, the other stayed put
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::NextToSend
    );
    assert_eq!(
        status_of(setup.pending[1].id, ctx).await,
        OfferStatus::Pending
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn advance_promotes_exactly_one_candidate(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 3).await;
    let td = ctx.test_deps();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    let active_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM request_offers WHERE favr_id = $1 AND status = 'next_to_send'",
    )
    .bind(setup.favr_id)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(active_count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn advance_on_last_candidate_exhausts_queue(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;
    let td = ctx.test_deps();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    assert_eq!(status_of(setup.active.id, ctx).await, OfferStatus::Sended);
    let active = Offer::find_by_favr_and_status(setup.favr_id, OfferStatus::NextToSend, &ctx.db_pool)
        .await
        .unwrap();
    assert!(active.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn advance_on_non_active_offer_is_a_no_op(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 1).await;
    let td = ctx.test_deps();

    // Advance a pending offer instead of the active one
    sequencer::advance(&setup.pending[0], &td.deps)
        .await
        .unwrap();

    assert_eq!(
        status_of(setup.active.id, ctx).await,
        OfferStatus::NextToSend
    );
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::Pending
    );
    assert!(td.push.calls().is_empty());
    assert!(td.sessions.emitted().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn accepted_favr_stops_further_dispatch(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 1).await;
    let td = ctx.test_deps();

    // Another candidate already accepted this favr
    let winner = create_user("partner", &ctx.db_pool).await.unwrap();
    create_offer(
        setup.favr_id,
        winner.id,
        setup.category_id,
        OfferStatus::Accepted,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    // No delivery, no status change
    assert_eq!(
        status_of(setup.active.id, ctx).await,
        OfferStatus::NextToSend
    );
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::Pending
    );
    assert!(td.push.calls().is_empty());
    assert!(td.sessions.emitted().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn dispatch_next_without_active_offer_is_a_no_op(ctx: &TestHarness) {
    let requester = create_user("customer", &ctx.db_pool).await.unwrap();
    let category = create_category(&ctx.db_pool).await.unwrap();
    let favr = create_favr(requester.id, category.id, &ctx.db_pool)
        .await
        .unwrap();
    let td = ctx.test_deps();

    sequencer::dispatch_next(favr.id, &td.deps).await.unwrap();

    assert!(td.push.calls().is_empty());
    assert!(td.sessions.emitted().is_empty());
}

// =============================================================================
// Delivery: live connection vs push fallback
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn live_candidate_gets_session_emit_and_no_push(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;
    let td = ctx.test_deps();

    create_device(setup.active.partner_id, &ctx.db_pool)
        .await
        .unwrap();
    td.sessions.connect("/partners", setup.active.partner_id);

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    let emitted = td.sessions.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].path, "/partners");
    assert_eq!(emitted[0].user_id, setup.active.partner_id);
    assert_eq!(emitted[0].event, "notification");
    assert_eq!(emitted[0].payload["action"], "request_favr");
    assert_eq!(
        emitted[0].payload["data"]["id"],
        setup.favr_id.to_string().as_str()
    );

    // Live delivery means no push and no persisted notification
    assert!(td.push.calls().is_empty());
    let notification_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(setup.active.partner_id)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(notification_count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn offline_candidate_gets_push_with_persisted_notification(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;
    let td = ctx.test_deps();

    let device = create_device(setup.active.partner_id, &ctx.db_pool)
        .await
        .unwrap();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    let calls = td.push.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].push_token, device.device_token);
    assert_eq!(calls[0].title, "Nuevo favor");
    assert!(calls[0].body.contains("tiene un nuevo favor"));
    assert_eq!(calls[0].data["type"], "add_request");
    assert_eq!(
        calls[0].data["favr_id"],
        setup.favr_id.to_string().as_str()
    );

    // The push is also persisted for the in-app feed
    let notification_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND kind = 'add_request'")
            .bind(setup.active.partner_id)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(notification_count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn push_failure_does_not_stall_the_queue(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 1).await;
    let td = ctx.test_deps();

    create_device(setup.active.partner_id, &ctx.db_pool)
        .await
        .unwrap();
    td.push.set_failing(true);

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    // Push failed but the cycle still completed
    assert_eq!(status_of(setup.active.id, ctx).await, OfferStatus::Sended);
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::NextToSend
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn candidate_without_device_still_advances(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 1).await;
    let td = ctx.test_deps();

    sequencer::advance(&setup.active, &td.deps).await.unwrap();

    assert!(td.push.calls().is_empty());
    assert_eq!(status_of(setup.active.id, ctx).await, OfferStatus::Sended);
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::NextToSend
    );
}

// =============================================================================
// Acceptance
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn accept_wins_only_once_per_favr(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;

    // A second candidate already holds a sended offer
    let rival = create_user("partner", &ctx.db_pool).await.unwrap();
    let rival_offer = create_offer(
        setup.favr_id,
        rival.id,
        setup.category_id,
        OfferStatus::Sended,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let first = Offer::accept(setup.active.id, &ctx.db_pool).await.unwrap();
    assert!(first.is_some());
    assert_eq!(first.unwrap().status, OfferStatus::Accepted);

    // The rival loses: the guarded UPDATE matches nothing
    let second = Offer::accept(rival_offer.id, &ctx.db_pool).await.unwrap();
    assert!(second.is_none());
    assert_eq!(status_of(rival_offer.id, ctx).await, OfferStatus::Sended);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn accept_rejects_parked_offers(ctx: &TestHarness) {
    let requester = create_user("customer", &ctx.db_pool).await.unwrap();
    let category = create_category(&ctx.db_pool).await.unwrap();
    let favr = create_favr(requester.id, category.id, &ctx.db_pool)
        .await
        .unwrap();
    let partner = create_user("partner", &ctx.db_pool).await.unwrap();

    let parked = create_offer(
        favr.id,
        partner.id,
        category.id,
        OfferStatus::NextToSendPending,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let accepted = Offer::accept(parked.id, &ctx.db_pool).await.unwrap();
    assert!(accepted.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn on_accepted_re_arms_parked_offer_when_acceptance_fell_through(ctx: &TestHarness) {
    let requester = create_user("customer", &ctx.db_pool).await.unwrap();
    let category = create_category(&ctx.db_pool).await.unwrap();
    let favr = create_favr(requester.id, category.id, &ctx.db_pool)
        .await
        .unwrap();
    let partner = create_user("partner", &ctx.db_pool).await.unwrap();
    let td = ctx.test_deps();

    let parked = create_offer(
        favr.id,
        partner.id,
        category.id,
        OfferStatus::NextToSendPending,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    sequencer::on_accepted(favr.id, &td.deps).await.unwrap();

    // Re-armed and immediately dispatched
    assert_eq!(status_of(parked.id, ctx).await, OfferStatus::Sended);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn on_accepted_leaves_parked_offer_when_favr_is_won(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;
    let td = ctx.test_deps();

    let parked_partner = create_user("partner", &ctx.db_pool).await.unwrap();
    let parked = create_offer(
        setup.favr_id,
        parked_partner.id,
        setup.category_id,
        OfferStatus::NextToSendPending,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    Offer::accept(setup.active.id, &ctx.db_pool)
        .await
        .unwrap()
        .expect("acceptance wins");

    sequencer::on_accepted(setup.favr_id, &td.deps).await.unwrap();

    assert_eq!(
        status_of(parked.id, ctx).await,
        OfferStatus::NextToSendPending
    );
    assert!(td.push.calls().is_empty());
}

// =============================================================================
// Restart recovery
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn recovery_dispatches_stranded_active_offers(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 1).await;
    let td = ctx.test_deps();

    sequencer::recover_in_flight(&td.deps).await.unwrap();

    // The stranded active offer was delivered and the queue moved on
    assert_eq!(status_of(setup.active.id, ctx).await, OfferStatus::Sended);
    assert_eq!(
        status_of(setup.pending[0].id, ctx).await,
        OfferStatus::NextToSend
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn recovery_re_arms_parked_offers(ctx: &TestHarness) {
    let requester = create_user("customer", &ctx.db_pool).await.unwrap();
    let category = create_category(&ctx.db_pool).await.unwrap();
    let favr = create_favr(requester.id, category.id, &ctx.db_pool)
        .await
        .unwrap();
    let partner = create_user("partner", &ctx.db_pool).await.unwrap();
    let td = ctx.test_deps();

    let parked = create_offer(
        favr.id,
        partner.id,
        category.id,
        OfferStatus::NextToSendPending,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    sequencer::recover_in_flight(&td.deps).await.unwrap();

    assert_eq!(status_of(parked.id, ctx).await, OfferStatus::Sended);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn recovery_skips_accepted_favrs(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 0).await;
    let td = ctx.test_deps();

    let winner = create_user("partner", &ctx.db_pool).await.unwrap();
    create_offer(
        setup.favr_id,
        winner.id,
        setup.category_id,
        OfferStatus::Accepted,
        &ctx.db_pool,
    )
    .await
    .unwrap();

    sequencer::recover_in_flight(&td.deps).await.unwrap();

    // Active offer for a won favr stays untouched
    assert_eq!(
        status_of(setup.active.id, ctx).await,
        OfferStatus::NextToSend
    );
}

// =============================================================================
// FIFO ordering
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn candidates_are_promoted_in_creation_order(ctx: &TestHarness) {
    let setup = setup_queue(ctx, 3).await;
    let td = ctx.test_deps();

    // Run the full cycle until the queue is exhausted
    let mut promoted_order = Vec::new();
    sequencer::advance(&setup.active, &td.deps).await.unwrap();
    loop {
        let Some(active) =
            Offer::find_by_favr_and_status(setup.favr_id, OfferStatus::NextToSend, &ctx.db_pool)
                .await
                .unwrap()
        else {
            break;
        };
        promoted_order.push(active.id);
        sequencer::advance(&active, &td.deps).await.unwrap();
    }

    let expected: Vec<Uuid> = setup.pending.iter().map(|o| o.id).collect();
    assert_eq!(promoted_order, expected);
}
