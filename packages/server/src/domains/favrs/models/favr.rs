use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::pagination::ValidatedPageParams;

/// Favr model - SQL persistence layer
///
/// A service request posted by a user, to be fulfilled by a partner.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Favr {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Favr joined with its category name and the requester's display fields.
///
/// This is the payload delivered to a candidate partner with an offer.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct FavrSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub category_name: String,
    pub requester_name: Option<String>,
    pub requester_last_name: Option<String>,
    pub requester_profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Favr {
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM favrs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert new favr
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO favrs (user_id, category_id, title, description, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(self.user_id)
        .bind(self.category_id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.status)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// One page of a user's favrs, newest first, plus the total count
    pub async fn find_page_for_user(
        user_id: Uuid,
        params: &ValidatedPageParams,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let results = sqlx::query_as::<_, Self>(
            "SELECT * FROM favrs
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favrs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((results, total))
    }
}

impl FavrSummary {
    /// Favr with category and requester display fields, for offer delivery
    pub async fn find(favr_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT f.id,
                    f.title,
                    f.description,
                    f.status,
                    c.name AS category_name,
                    u.name AS requester_name,
                    u.last_name AS requester_last_name,
                    u.profile_picture AS requester_profile_picture,
                    f.created_at
             FROM favrs f
             JOIN categories c ON c.id = f.category_id
             JOIN users u ON u.id = f.user_id
             WHERE f.id = $1",
        )
        .bind(favr_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
