//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// User entity
///
/// Deliberately not `Serialize`: responses go through [`UserProfile`] so the
/// password hash never leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

/// Public view of a user returned on login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            last_login: user.last_login,
        }
    }
}

/// Unique user field that collided at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
    Mobile,
}

impl ConflictField {
    /// Pick the colliding field of `existing`, checking username, then email.
    /// A user that matched on neither must have matched on mobile.
    pub fn between(existing: &User, username: &str, email: &str) -> Self {
        if existing.username == username {
            ConflictField::Username
        } else if existing.email == email {
            ConflictField::Email
        } else {
            ConflictField::Mobile
        }
    }

    /// Map a unique constraint name from the users table
    pub fn from_constraint(constraint: &str) -> Option<Self> {
        match constraint {
            "users_username_key" => Some(ConflictField::Username),
            "users_email_key" => Some(ConflictField::Email),
            "users_mobile_key" => Some(ConflictField::Mobile),
            _ => None,
        }
    }

    /// Client-facing conflict message
    pub fn message(self) -> &'static str {
        match self {
            ConflictField::Username => "Username already exists.",
            ConflictField::Email => "Email already exists.",
            ConflictField::Mobile => "Mobile number already exists.",
        }
    }
}

/// Request body for registration
///
/// Every field is optional at the wire level so that all missing fields can
/// be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile: Option<String>,
}

/// Read an optional text field that clients may also send as a JSON number
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(Option::<Text>::deserialize(deserializer)?.map(|text| match text {
        Text::Str(s) => s,
        Text::Num(n) => n.to_string(),
    }))
}

/// Request body for login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}
