use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User model - SQL persistence layer
///
/// `password_hash` is nullable: accounts created through social sign-in have
/// no local password and cannot log in with one.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find a non-admin user by email. Emails are stored lowercase, so the
    /// lookup lowercases its input too.
    pub async fn find_by_email_non_admin(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1 AND role <> 'admin'")
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert new user
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (
                email,
                password_hash,
                name,
                last_name,
                role,
                phone_number,
                profile_picture
             )
             VALUES (lower($1), $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(&self.name)
        .bind(&self.last_name)
        .bind(&self.role)
        .bind(&self.phone_number)
        .bind(&self.profile_picture)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
