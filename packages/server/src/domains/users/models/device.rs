use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Registered push device. A user may register several over time; the most
/// recent row is the active push target.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Device {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_token: String,
    pub created_at: DateTime<Utc>,
}

impl Device {
    /// Register a device token for a user
    pub async fn register(user_id: Uuid, device_token: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO devices (user_id, device_token)
             VALUES ($1, $2)
             RETURNING *",
        )
        .bind(user_id)
        .bind(device_token)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Most recently registered device for a user, if any
    pub async fn latest_for_user(user_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM devices
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Remove a device token on logout. Scoped to the user when known.
    ///
    /// Returns the number of rows removed.
    pub async fn remove(
        user_id: Option<Uuid>,
        device_token: &str,
        pool: &PgPool,
    ) -> Result<u64> {
        let result = match user_id {
            Some(user_id) => {
                sqlx::query("DELETE FROM devices WHERE user_id = $1 AND device_token = $2")
                    .bind(user_id)
                    .bind(device_token)
                    .execute(pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM devices WHERE device_token = $1")
                    .bind(device_token)
                    .execute(pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }
}
