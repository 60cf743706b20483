use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::pagination::ValidatedPageParams;

/// Persisted notification - every push gets a row so users can review
/// missed notifications in-app.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub async fn insert(
        user_id: Uuid,
        title: &str,
        body: &str,
        kind: &str,
        metadata: serde_json::Value,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO notifications (user_id, title, body, kind, metadata)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(user_id)
        .bind(title)
        .bind(body)
        .bind(kind)
        .bind(metadata)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// One page of a user's notifications, newest first, plus the total count
    pub async fn find_page_for_user(
        user_id: Uuid,
        params: &ValidatedPageParams,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let results = sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok((results, total))
    }
}
