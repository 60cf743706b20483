//! Row builders for integration tests.
//!
//! The database is shared across tests, so every fixture uses fresh UUIDs
//! and unique emails; tests assert only on rows they created.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use favr_core::domains::favrs::{Category, Favr};
use favr_core::domains::offers::{Offer, OfferStatus};
use favr_core::domains::users::{Device, User};

pub async fn create_user(role: &str, pool: &PgPool) -> Result<User> {
    let user = User {
        id: Uuid::new_v4(),
        email: format!("user-{}@test.example", Uuid::new_v4()),
        password_hash: None,
        name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        role: role.to_string(),
        phone_number: None,
        profile_picture: None,
        created_at: Utc::now(),
    };
    user.insert(pool).await
}

pub async fn create_user_with_password(
    role: &str,
    password_hash: Option<String>,
    pool: &PgPool,
) -> Result<User> {
    let user = User {
        id: Uuid::new_v4(),
        email: format!("user-{}@test.example", Uuid::new_v4()),
        password_hash,
        name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        role: role.to_string(),
        phone_number: None,
        profile_picture: None,
        created_at: Utc::now(),
    };
    user.insert(pool).await
}

pub async fn create_category(pool: &PgPool) -> Result<Category> {
    Category::insert(&format!("Categoria {}", Uuid::new_v4()), pool).await
}

pub async fn create_favr(user_id: Uuid, category_id: Uuid, pool: &PgPool) -> Result<Favr> {
    let favr = Favr {
        id: Uuid::new_v4(),
        user_id,
        category_id,
        title: "Arreglar la puerta".to_string(),
        description: "La puerta del frente no cierra bien".to_string(),
        status: "open".to_string(),
        created_at: Utc::now(),
    };
    favr.insert(pool).await
}

pub async fn create_device(user_id: Uuid, pool: &PgPool) -> Result<Device> {
    Device::register(
        user_id,
        &format!("ExponentPushToken[{}]", Uuid::new_v4()),
        pool,
    )
    .await
}

/// Insert an offer directly in a given status.
pub async fn create_offer(
    favr_id: Uuid,
    partner_id: Uuid,
    category_id: Uuid,
    status: OfferStatus,
    pool: &PgPool,
) -> Result<Offer> {
    let offer = Offer {
        id: Uuid::new_v4(),
        favr_id,
        partner_id,
        category_id,
        socket_path: "/partners".to_string(),
        socket_emitter: "notification".to_string(),
        status,
        created_at: Utc::now(),
    };
    offer.insert(pool).await
}

/// Insert an offer and backdate its `created_at` so FIFO ordering in a test
/// does not depend on insert timing.
pub async fn create_offer_at(
    favr_id: Uuid,
    partner_id: Uuid,
    category_id: Uuid,
    status: OfferStatus,
    created_at: DateTime<Utc>,
    pool: &PgPool,
) -> Result<Offer> {
    let offer = create_offer(favr_id, partner_id, category_id, status, pool).await?;
    sqlx::query_as::<_, Offer>(
        "UPDATE request_offers SET created_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(offer.id)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Timestamps `minutes_ago` in the past, for ordering fixtures.
pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}
