/// Watch-progress tracking
use crate::{
    account::ValidatedSession,
    db::{self, models::{Film, WatchProgress}},
    error::{MiraError, MiraResult},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Resume point returned to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub last_timestamp: f64,
    pub completed: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            last_timestamp: 0.0,
            completed: false,
        }
    }
}

/// Body of a progress save
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub last_timestamp: f64,
    #[serde(default)]
    pub completed: bool,
}

/// Unfinished film for the "continue watching" shelf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressFilm {
    #[serde(flatten)]
    pub progress: WatchProgress,
    pub film: Film,
}

#[derive(FromRow)]
struct InProgressRow {
    progress_id: String,
    progress_user_id: String,
    progress_film_id: String,
    last_timestamp: f64,
    completed: bool,
    progress_updated_at: chrono::DateTime<Utc>,
    #[sqlx(flatten)]
    film: Film,
}

/// Per-user, per-film resume tracker
#[derive(Clone)]
pub struct WatchProgressTracker {
    db: SqlitePool,
}

impl WatchProgressTracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stored resume point, or the start of the film when none exists
    pub async fn get(&self, session: &ValidatedSession, film_id: &str) -> MiraResult<ProgressState> {
        let state = sqlx::query_as::<_, (f64, bool)>(
            "SELECT last_timestamp, completed FROM watch_progress WHERE user_id = ?1 AND film_id = ?2",
        )
        .bind(&session.user_id)
        .bind(film_id)
        .fetch_optional(&self.db)
        .await?
        .map(|(last_timestamp, completed)| ProgressState {
            last_timestamp,
            completed,
        })
        .unwrap_or_default();

        Ok(state)
    }

    /// Create or overwrite the caller's resume point for a film
    pub async fn save(
        &self,
        session: &ValidatedSession,
        film_id: &str,
        update: ProgressUpdate,
    ) -> MiraResult<WatchProgress> {
        if !update.last_timestamp.is_finite() || update.last_timestamp < 0.0 {
            return Err(MiraError::Validation(
                "lastTimestamp must be a non-negative number of seconds".to_string(),
            ));
        }

        let film: Option<i64> = sqlx::query_scalar("SELECT 1 FROM films WHERE id = ?1")
            .bind(film_id)
            .fetch_optional(&self.db)
            .await?;
        if film.is_none() {
            return Err(MiraError::NotFound(format!("Film not found: {}", film_id)));
        }

        let progress = sqlx::query_as::<_, WatchProgress>(
            r#"
            INSERT INTO watch_progress (id, user_id, film_id, last_timestamp, completed, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (user_id, film_id) DO UPDATE SET
                last_timestamp = excluded.last_timestamp,
                completed = excluded.completed,
                updated_at = excluded.updated_at
            RETURNING id, user_id, film_id, last_timestamp, completed, updated_at
            "#,
        )
        .bind(db::new_id())
        .bind(&session.user_id)
        .bind(film_id)
        .bind(update.last_timestamp)
        .bind(update.completed)
        .bind(db::timestamp(Utc::now()))
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(
            film_id = %film_id,
            user_id = %session.user_id,
            at = update.last_timestamp,
            completed = update.completed,
            "progress saved"
        );

        Ok(progress)
    }

    /// Unfinished films, most recently watched first
    pub async fn continue_watching(&self, session: &ValidatedSession) -> MiraResult<Vec<InProgressFilm>> {
        let rows = sqlx::query_as::<_, InProgressRow>(
            r#"
            SELECT wp.id AS progress_id, wp.user_id AS progress_user_id,
                   wp.film_id AS progress_film_id, wp.last_timestamp, wp.completed,
                   wp.updated_at AS progress_updated_at,
                   f.id, f.title, f.description, f.thumbnail_url, f.video_url, f.video_asset_id,
                   f.duration, f.category, f.tags, f.visibility, f.views, f.likes, f.director,
                   f.year, f.language, f.trailer_url, f.trailer_asset_id, f.bts_url,
                   f.bts_asset_id, f.bts_thumbnail_url, f.bts_duration, f.created_at, f.updated_at
            FROM watch_progress wp
            JOIN films f ON f.id = wp.film_id
            WHERE wp.user_id = ?1 AND wp.completed = 0
            ORDER BY wp.updated_at DESC, wp.rowid DESC
            "#,
        )
        .bind(&session.user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InProgressFilm {
                progress: WatchProgress {
                    id: row.progress_id,
                    user_id: row.progress_user_id,
                    film_id: row.progress_film_id,
                    last_timestamp: row.last_timestamp,
                    completed: row.completed,
                    updated_at: row.progress_updated_at,
                },
                film: row.film,
            })
            .collect())
    }
}
