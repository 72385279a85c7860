/// Film library management
use crate::{
    db::{self, models::{Film, Visibility}},
    error::{MiraError, MiraResult},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, SqlitePool};
use validator::Validate;

const FILM_COLUMNS: &str = "id, title, description, thumbnail_url, video_url, video_asset_id, \
    duration, category, tags, visibility, views, likes, director, year, language, \
    trailer_url, trailer_asset_id, bts_url, bts_asset_id, bts_thumbnail_url, bts_duration, \
    created_at, updated_at";

/// Editable film fields, shared by create and update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilmInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub video_asset_id: Option<String>,
    pub duration: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub director: Option<String>,
    pub year: Option<i64>,
    pub language: Option<String>,
    pub trailer_url: Option<String>,
    pub trailer_asset_id: Option<String>,
    pub bts_url: Option<String>,
    pub bts_asset_id: Option<String>,
    pub bts_thumbnail_url: Option<String>,
    pub bts_duration: Option<String>,
}

impl FilmInput {
    fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.tags)
    }
}

/// Partial film edit; omitted fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilmPatch {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub video_asset_id: Option<String>,
    pub duration: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub director: Option<String>,
    pub year: Option<i64>,
    pub language: Option<String>,
    pub trailer_url: Option<String>,
    pub trailer_asset_id: Option<String>,
    pub bts_url: Option<String>,
    pub bts_asset_id: Option<String>,
    pub bts_thumbnail_url: Option<String>,
    pub bts_duration: Option<String>,
}

/// Trimmed, de-duplicated, non-empty tags
fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Film manager
#[derive(Clone)]
pub struct FilmManager {
    db: SqlitePool,
}

impl FilmManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Films newest first; private films only when `include_private`
    pub async fn list(&self, include_private: bool) -> MiraResult<Vec<Film>> {
        let films = sqlx::query_as::<_, Film>(&format!(
            "SELECT {} FROM films
             WHERE ?1 OR visibility = 'PUBLIC'
             ORDER BY created_at DESC, rowid DESC",
            FILM_COLUMNS
        ))
        .bind(include_private)
        .fetch_all(&self.db)
        .await?;

        Ok(films)
    }

    /// Any film by id, regardless of visibility
    pub async fn get(&self, id: &str) -> MiraResult<Film> {
        sqlx::query_as::<_, Film>(&format!("SELECT {} FROM films WHERE id = ?1", FILM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| MiraError::NotFound(format!("Film not found: {}", id)))
    }

    /// A film as seen by a viewer; private films look missing to non-admins
    pub async fn get_visible(&self, id: &str, include_private: bool) -> MiraResult<Film> {
        let film = self.get(id).await?;
        if !include_private && film.visibility == Visibility::Private {
            return Err(MiraError::NotFound(format!("Film not found: {}", id)));
        }
        Ok(film)
    }

    /// Match title, description or category (case-insensitive) or an exact tag
    pub async fn search(&self, query: &str, include_private: bool) -> MiraResult<Vec<Film>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MiraError::Validation(
                "Query parameter 'q' is required".to_string(),
            ));
        }

        let pattern = format!("%{}%", query.to_lowercase());
        let films = sqlx::query_as::<_, Film>(&format!(
            "SELECT {} FROM films
             WHERE (?3 OR visibility = 'PUBLIC')
               AND (lower(title) LIKE ?1
                    OR lower(description) LIKE ?1
                    OR lower(coalesce(category, '')) LIKE ?1
                    OR EXISTS (SELECT 1 FROM json_each(films.tags) WHERE json_each.value = ?2))
             ORDER BY created_at DESC, rowid DESC",
            FILM_COLUMNS
        ))
        .bind(&pattern)
        .bind(query)
        .bind(include_private)
        .fetch_all(&self.db)
        .await?;

        Ok(films)
    }

    /// Most viewed public films
    pub async fn trending(&self, limit: i64) -> MiraResult<Vec<Film>> {
        let films = sqlx::query_as::<_, Film>(&format!(
            "SELECT {} FROM films
             WHERE visibility = 'PUBLIC'
             ORDER BY views DESC, created_at DESC, rowid DESC
             LIMIT ?1",
            FILM_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(films)
    }

    /// Public films sharing the film's category, newest first
    pub async fn related(&self, id: &str, limit: i64) -> MiraResult<Vec<Film>> {
        let film = self.get(id).await?;
        let Some(category) = film.category else {
            return Ok(Vec::new());
        };

        let films = sqlx::query_as::<_, Film>(&format!(
            "SELECT {} FROM films
             WHERE visibility = 'PUBLIC' AND category = ?1 AND id != ?2
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?3",
            FILM_COLUMNS
        ))
        .bind(&category)
        .bind(id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(films)
    }

    pub async fn create(&self, input: FilmInput) -> MiraResult<Film> {
        input.validate()?;

        let id = db::new_id();
        let now = db::timestamp(Utc::now());
        let tags = input.normalized_tags();

        sqlx::query(
            "INSERT INTO films (id, title, description, thumbnail_url, video_url, video_asset_id,
                duration, category, tags, visibility, director, year, language,
                trailer_url, trailer_asset_id, bts_url, bts_asset_id, bts_thumbnail_url, bts_duration,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)",
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.thumbnail_url)
        .bind(&input.video_url)
        .bind(&input.video_asset_id)
        .bind(&input.duration)
        .bind(&input.category)
        .bind(Json(tags))
        .bind(input.visibility)
        .bind(&input.director)
        .bind(input.year)
        .bind(&input.language)
        .bind(&input.trailer_url)
        .bind(&input.trailer_asset_id)
        .bind(&input.bts_url)
        .bind(&input.bts_asset_id)
        .bind(&input.bts_thumbnail_url)
        .bind(&input.bts_duration)
        .bind(&now)
        .execute(&self.db)
        .await?;

        tracing::info!(film_id = %id, title = %input.title, "created film");

        self.get(&id).await
    }

    /// Apply a partial edit
    pub async fn update(&self, id: &str, patch: FilmPatch) -> MiraResult<Film> {
        patch.validate()?;

        let tags = patch.tags.as_deref().map(|t| Json(normalize_tags(t)));
        let result = sqlx::query(
            "UPDATE films SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                thumbnail_url = COALESCE(?3, thumbnail_url),
                video_url = COALESCE(?4, video_url),
                video_asset_id = COALESCE(?5, video_asset_id),
                duration = COALESCE(?6, duration),
                category = COALESCE(?7, category),
                tags = COALESCE(?8, tags),
                visibility = COALESCE(?9, visibility),
                director = COALESCE(?10, director),
                year = COALESCE(?11, year),
                language = COALESCE(?12, language),
                trailer_url = COALESCE(?13, trailer_url),
                trailer_asset_id = COALESCE(?14, trailer_asset_id),
                bts_url = COALESCE(?15, bts_url),
                bts_asset_id = COALESCE(?16, bts_asset_id),
                bts_thumbnail_url = COALESCE(?17, bts_thumbnail_url),
                bts_duration = COALESCE(?18, bts_duration),
                updated_at = ?19
             WHERE id = ?20",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.thumbnail_url)
        .bind(&patch.video_url)
        .bind(&patch.video_asset_id)
        .bind(&patch.duration)
        .bind(&patch.category)
        .bind(tags)
        .bind(patch.visibility)
        .bind(&patch.director)
        .bind(patch.year)
        .bind(&patch.language)
        .bind(&patch.trailer_url)
        .bind(&patch.trailer_asset_id)
        .bind(&patch.bts_url)
        .bind(&patch.bts_asset_id)
        .bind(&patch.bts_thumbnail_url)
        .bind(&patch.bts_duration)
        .bind(db::timestamp(Utc::now()))
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("Film not found: {}", id)));
        }

        tracing::info!(film_id = %id, "updated film");

        self.get(id).await
    }

    /// Delete a film; comments, favorites, progress and collection links cascade
    pub async fn delete(&self, id: &str) -> MiraResult<()> {
        let result = sqlx::query("DELETE FROM films WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("Film not found: {}", id)));
        }

        tracing::info!(film_id = %id, "deleted film");
        Ok(())
    }

    pub async fn record_view(&self, id: &str) -> MiraResult<()> {
        let result = sqlx::query("UPDATE films SET views = views + 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("Film not found: {}", id)));
        }

        Ok(())
    }

    /// Every asset id already attached to a stored film
    pub async fn imported_asset_ids(&self) -> MiraResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT video_asset_id FROM films WHERE video_asset_id IS NOT NULL",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }
}
