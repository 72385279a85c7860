/// Curated, explicitly ordered film collections
use crate::{
    db::{self, models::{Collection, CollectionFilm, Film}},
    error::{MiraError, MiraResult},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CollectionInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
}

/// Partial collection edit; omitted fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CollectionPatch {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A link together with the film it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub id: String,
    pub film_id: String,
    pub order: i64,
    pub film: Film,
}

/// Collection with its films in link order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithFilms {
    #[serde(flatten)]
    pub collection: Collection,
    pub films: Vec<CollectionEntry>,
}

/// Joined link + film row
#[derive(FromRow)]
struct EntryRow {
    link_id: String,
    collection_id: String,
    link_order: i64,
    #[sqlx(flatten)]
    film: Film,
}

/// Collection manager
#[derive(Clone)]
pub struct CollectionManager {
    db: SqlitePool,
}

impl CollectionManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All collections newest first, each with its films
    pub async fn list(&self) -> MiraResult<Vec<CollectionWithFilms>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, title, description, created_at, updated_at
             FROM collections ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<String> = collections.iter().map(|c| c.id.clone()).collect();
        let mut entries = self.entries_for(&ids).await?;

        Ok(collections
            .into_iter()
            .map(|collection| {
                let films = entries.remove(&collection.id).unwrap_or_default();
                CollectionWithFilms { collection, films }
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> MiraResult<CollectionWithFilms> {
        let collection = sqlx::query_as::<_, Collection>(
            "SELECT id, title, description, created_at, updated_at FROM collections WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| MiraError::NotFound(format!("Collection not found: {}", id)))?;

        let films = self
            .entries_for(&[collection.id.clone()])
            .await?
            .remove(&collection.id)
            .unwrap_or_default();

        Ok(CollectionWithFilms { collection, films })
    }

    pub async fn create(&self, input: CollectionInput) -> MiraResult<Collection> {
        input.validate()?;

        let id = db::new_id();
        let now = db::timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO collections (id, title, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&now)
        .execute(&self.db)
        .await?;

        tracing::info!(collection_id = %id, "created collection");

        Ok(self.get(&id).await?.collection)
    }

    pub async fn update(&self, id: &str, patch: CollectionPatch) -> MiraResult<Collection> {
        patch.validate()?;

        let result = sqlx::query(
            "UPDATE collections SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                updated_at = ?3
             WHERE id = ?4",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(db::timestamp(Utc::now()))
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("Collection not found: {}", id)));
        }

        Ok(self.get(id).await?.collection)
    }

    pub async fn delete(&self, id: &str) -> MiraResult<()> {
        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("Collection not found: {}", id)));
        }

        tracing::info!(collection_id = %id, "deleted collection");
        Ok(())
    }

    /// Link a film into a collection at the given position
    pub async fn add_film(
        &self,
        collection_id: &str,
        film_id: &str,
        order: i64,
    ) -> MiraResult<CollectionFilm> {
        let collection: Option<i64> = sqlx::query_scalar("SELECT 1 FROM collections WHERE id = ?1")
            .bind(collection_id)
            .fetch_optional(&self.db)
            .await?;
        if collection.is_none() {
            return Err(MiraError::NotFound(format!(
                "Collection not found: {}",
                collection_id
            )));
        }

        let film: Option<i64> = sqlx::query_scalar("SELECT 1 FROM films WHERE id = ?1")
            .bind(film_id)
            .fetch_optional(&self.db)
            .await?;
        if film.is_none() {
            return Err(MiraError::NotFound(format!("Film not found: {}", film_id)));
        }

        let id = db::new_id();
        let inserted = sqlx::query(
            r#"INSERT INTO collection_films (id, collection_id, film_id, "order")
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (collection_id, film_id) DO NOTHING"#,
        )
        .bind(&id)
        .bind(collection_id)
        .bind(film_id)
        .bind(order)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(MiraError::Conflict(
                "Film is already in this collection".to_string(),
            ));
        }

        Ok(CollectionFilm {
            id,
            collection_id: collection_id.to_string(),
            film_id: film_id.to_string(),
            order,
        })
    }

    pub async fn remove_film(&self, collection_id: &str, film_id: &str) -> MiraResult<()> {
        let result =
            sqlx::query("DELETE FROM collection_films WHERE collection_id = ?1 AND film_id = ?2")
                .bind(collection_id)
                .bind(film_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(
                "Film is not in this collection".to_string(),
            ));
        }

        Ok(())
    }

    /// Links for a set of collections, grouped by collection, ascending order
    async fn entries_for(
        &self,
        collection_ids: &[String],
    ) -> MiraResult<HashMap<String, Vec<CollectionEntry>>> {
        let mut grouped: HashMap<String, Vec<CollectionEntry>> = HashMap::new();
        if collection_ids.is_empty() {
            return Ok(grouped);
        }

        let sql = r#"SELECT cf.id AS link_id, cf.collection_id, cf."order" AS link_order,
                      f.id, f.title, f.description, f.thumbnail_url, f.video_url, f.video_asset_id,
                      f.duration, f.category, f.tags, f.visibility, f.views, f.likes, f.director,
                      f.year, f.language, f.trailer_url, f.trailer_asset_id, f.bts_url,
                      f.bts_asset_id, f.bts_thumbnail_url, f.bts_duration, f.created_at, f.updated_at
               FROM collection_films cf
               JOIN films f ON f.id = cf.film_id
               WHERE cf.collection_id IN (SELECT value FROM json_each(?1))
               ORDER BY cf."order" ASC, cf.rowid ASC"#;

        let rows = sqlx::query_as::<_, EntryRow>(sql)
            .bind(
                serde_json::to_string(collection_ids)
                    .map_err(|e| MiraError::Internal(e.to_string()))?,
            )
            .fetch_all(&self.db)
            .await?;

        for row in rows {
            let film = row.film;
            grouped
                .entry(row.collection_id)
                .or_default()
                .push(CollectionEntry {
                    id: row.link_id,
                    film_id: film.id.clone(),
                    order: row.link_order,
                    film,
                });
        }

        Ok(grouped)
    }
}
