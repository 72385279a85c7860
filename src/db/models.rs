/// Row models and their JSON shapes
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

/// Account role; mutated only out of band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// Film visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// User record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Public profile fields attached to comments
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Film record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    /// Playback id on the video host
    pub video_url: Option<String>,
    pub video_asset_id: Option<String>,
    pub duration: Option<String>,
    pub category: Option<String>,
    pub tags: Json<Vec<String>>,
    pub visibility: Visibility,
    pub views: i64,
    pub likes: i64,
    pub director: Option<String>,
    pub year: Option<i64>,
    pub language: Option<String>,
    pub trailer_url: Option<String>,
    pub trailer_asset_id: Option<String>,
    pub bts_url: Option<String>,
    pub bts_asset_id: Option<String>,
    pub bts_thumbnail_url: Option<String>,
    pub bts_duration: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordered link between a collection and a film
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFilm {
    pub id: String,
    pub collection_id: String,
    pub film_id: String,
    pub order: i64,
}

/// Comment row as stored
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub film_id: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A (user, comment) like; existence is the liked state
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLike {
    pub id: String,
    pub user_id: String,
    pub comment_id: String,
    pub created_at: DateTime<Utc>,
}

/// Report against a comment
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub reason: String,
    pub user_id: String,
    pub comment_id: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user, per-film resume point
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub id: String,
    pub user_id: String,
    pub film_id: String,
    pub last_timestamp: f64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}
