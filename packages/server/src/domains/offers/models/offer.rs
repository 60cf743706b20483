use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Offer lifecycle status.
///
/// Stored as the `offer_status` Postgres enum. Transitions are validated
/// centrally in [`OfferStatus::can_transition`]; the guarded UPDATE
/// statements below enforce the same rules atomically in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Waiting in the candidate queue
    Pending,
    /// The favr's single active candidate, due for delivery
    NextToSend,
    /// Parked awaiting confirmation; recovery re-arms it to `NextToSend`
    NextToSendPending,
    /// Delivered to the candidate (live or via push)
    Sended,
    /// Candidate accepted; terminal, at most one per favr
    Accepted,
}

impl OfferStatus {
    /// Central transition table for the offer lifecycle.
    pub fn can_transition(self, to: OfferStatus) -> bool {
        use OfferStatus::*;
        matches!(
            (self, to),
            (Pending, NextToSend)
                | (NextToSend, Sended)
                | (NextToSendPending, NextToSend)
                | (Pending, Accepted)
                | (NextToSend, Accepted)
                | (Sended, Accepted)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == OfferStatus::Accepted
    }
}

/// Offer model - one row per (favr, candidate partner) pairing
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Offer {
    pub id: Uuid,
    pub favr_id: Uuid,
    pub partner_id: Uuid,
    pub category_id: Uuid,
    /// Session route: scope path of the candidate's live connection
    pub socket_path: String,
    /// Session route: event name to emit on
    pub socket_emitter: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM request_offers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new offer in `pending` state
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO request_offers (
                favr_id,
                partner_id,
                category_id,
                socket_path,
                socket_emitter,
                status
             )
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(self.favr_id)
        .bind(self.partner_id)
        .bind(self.category_id)
        .bind(&self.socket_path)
        .bind(&self.socket_emitter)
        .bind(self.status)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Find an offer for a favr in a given status.
    ///
    /// With the per-favr invariants held, at most one row matches for
    /// `next_to_send` and `accepted`; oldest-first makes the FIFO choice
    /// explicit for `pending`.
    pub async fn find_by_favr_and_status(
        favr_id: Uuid,
        status: OfferStatus,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM request_offers
             WHERE favr_id = $1 AND status = $2
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
        )
        .bind(favr_id)
        .bind(status)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// The candidate's offer for a favr, regardless of status
    pub async fn find_for_partner(
        favr_id: Uuid,
        partner_id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM request_offers WHERE favr_id = $1 AND partner_id = $2",
        )
        .bind(favr_id)
        .bind(partner_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// All offers in an in-flight sequencing state, for restart recovery
    pub async fn find_in_flight(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM request_offers
             WHERE status IN ('next_to_send', 'next_to_send_pending')
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Favrs that currently hold an active (`next_to_send`) offer
    pub async fn favrs_with_next_to_send(pool: &PgPool) -> Result<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT DISTINCT favr_id FROM request_offers WHERE status = 'next_to_send'",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark this offer delivered: `next_to_send -> sended`.
    ///
    /// The acceptance guard is part of the statement rather than a separate
    /// read, so a concurrent acceptance cannot slip between check and write.
    /// Returns false if the offer was not in `next_to_send` anymore or the
    /// favr already has an accepted offer.
    pub async fn mark_sended(id: Uuid, favr_id: Uuid, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE request_offers SET status = 'sended'
             WHERE id = $1
               AND status = 'next_to_send'
               AND NOT EXISTS (
                   SELECT 1 FROM request_offers
                   WHERE favr_id = $2 AND status = 'accepted'
               )",
        )
        .bind(id)
        .bind(favr_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Promote the oldest `pending` offer for a favr to `next_to_send`.
    ///
    /// Guarded against an existing accepted offer and against a second
    /// active candidate. Returns the promoted offer, if any.
    pub async fn promote_oldest_pending(favr_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE request_offers SET status = 'next_to_send'
             WHERE id = (
                 SELECT id FROM request_offers
                 WHERE favr_id = $1
                   AND status = 'pending'
                   AND NOT EXISTS (
                       SELECT 1 FROM request_offers
                       WHERE favr_id = $1 AND status = 'accepted'
                   )
                   AND NOT EXISTS (
                       SELECT 1 FROM request_offers
                       WHERE favr_id = $1 AND status = 'next_to_send'
                   )
                 ORDER BY created_at ASC, id ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING *",
        )
        .bind(favr_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Re-arm a parked offer: `next_to_send_pending -> next_to_send`.
    pub async fn promote_next_to_send_pending(
        favr_id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE request_offers SET status = 'next_to_send'
             WHERE id = (
                 SELECT id FROM request_offers
                 WHERE favr_id = $1
                   AND status = 'next_to_send_pending'
                   AND NOT EXISTS (
                       SELECT 1 FROM request_offers
                       WHERE favr_id = $1 AND status = 'accepted'
                   )
                 ORDER BY created_at ASC, id ASC
                 LIMIT 1
             )
             RETURNING *",
        )
        .bind(favr_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Accept this offer atomically.
    ///
    /// Single conditional UPDATE: the offer must still be in an acceptable
    /// state and no other offer for the favr may already be accepted. The
    /// partial unique index on (favr_id) WHERE accepted backs this up at the
    /// storage level. Returns the accepted offer when the caller won, None
    /// when another candidate got there first (or the state was wrong).
    pub async fn accept(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE request_offers SET status = 'accepted'
             WHERE id = $1
               AND status IN ('pending', 'next_to_send', 'sended')
               AND NOT EXISTS (
                   SELECT 1 FROM request_offers other
                   WHERE other.favr_id = request_offers.favr_id
                     AND other.status = 'accepted'
               )
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use OfferStatus::*;

        assert!(Pending.can_transition(NextToSend));
        assert!(NextToSend.can_transition(Sended));
        assert!(NextToSendPending.can_transition(NextToSend));
        assert!(Pending.can_transition(Accepted));
        assert!(NextToSend.can_transition(Accepted));
        assert!(Sended.can_transition(Accepted));
    }

    #[test]
    fn test_illegal_transitions() {
        use OfferStatus::*;

        // Accepted is terminal
        assert!(!Accepted.can_transition(Pending));
        assert!(!Accepted.can_transition(NextToSend));
        assert!(!Accepted.can_transition(Sended));

        // No skipping the active slot
        assert!(!Pending.can_transition(Sended));
        assert!(!Sended.can_transition(NextToSend));
        assert!(!NextToSendPending.can_transition(Sended));
        assert!(!NextToSendPending.can_transition(Accepted));
    }

    #[test]
    fn test_terminal() {
        assert!(OfferStatus::Accepted.is_terminal());
        assert!(!OfferStatus::Sended.is_terminal());
    }
}
