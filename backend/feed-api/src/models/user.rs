use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registered user
///
/// `post_ids` mirrors the posts this user authored, in creation order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "posts")]
    pub post_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a user whose password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Signup request body
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(email(message = "Please enter a valid email."))]
    pub email: String,
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters long."))]
    pub password: String,
}

impl SignupRequest {
    /// Trim every field and lower-case the email.
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            name: self.name.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}
