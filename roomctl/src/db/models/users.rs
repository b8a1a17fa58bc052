//! Database models for users.

use crate::api::models::users::{Role, UserUpdate};
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub roles: Vec<Role>,
    /// `native`, `proxy-header` or `system`
    pub auth_source: String,
    pub password_hash: Option<String>,
}

impl UserCreateDBRequest {
    /// A standard user created on first sight of a trusted proxy header
    pub fn from_proxy_header(email: &str) -> Self {
        Self {
            username: email.to_string(),
            email: email.to_string(),
            display_name: None,
            is_admin: false,
            roles: vec![Role::StandardUser],
            auth_source: "proxy-header".to_string(),
            password_hash: None,
        }
    }
}

/// Database request for updating a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub display_name: Option<String>,
    pub roles: Option<Vec<Role>>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserUpdateDBRequest {
    pub fn new(update: UserUpdate) -> Self {
        Self {
            display_name: update.display_name,
            roles: update.roles,
            ..Default::default()
        }
    }
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub auth_source: String,
    pub is_admin: bool,
    pub roles: Vec<Role>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
