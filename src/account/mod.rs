/// Account management
///
/// Handles user creation, roles, session tokens and public profiles.

mod manager;

pub use manager::AccountManager;

use crate::db::models::UserRole;
use serde::{Deserialize, Serialize};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity resolved from a session token
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub user_id: String,
    pub role: UserRole,
}

impl ValidatedSession {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Per-user activity counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCounts {
    pub comments: i64,
    pub comment_likes: i64,
}

/// Public profile (GET /users/{id})
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    #[serde(rename = "_count")]
    pub counts: ProfileCounts,
}
