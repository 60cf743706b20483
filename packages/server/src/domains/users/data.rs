use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::users::models::user::User;

/// Public API representation of a user (for JSON responses)
///
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            last_name: user.last_name,
            role: user.role,
            phone_number: user.phone_number,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}
