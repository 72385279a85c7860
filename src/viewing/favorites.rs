/// Favorites: a (user, film) row whose existence is the favorited state
use crate::{
    account::ValidatedSession,
    db::{self, models::Film},
    error::{MiraError, MiraResult},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteState {
    pub favorited: bool,
}

#[derive(Clone)]
pub struct FavoriteManager {
    db: SqlitePool,
}

impl FavoriteManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Anonymous callers never have favorites
    pub async fn is_favorited(
        &self,
        session: Option<&ValidatedSession>,
        film_id: &str,
    ) -> MiraResult<FavoriteState> {
        let Some(session) = session else {
            return Ok(FavoriteState { favorited: false });
        };

        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM favorites WHERE user_id = ?1 AND film_id = ?2")
                .bind(&session.user_id)
                .bind(film_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(FavoriteState {
            favorited: found.is_some(),
        })
    }

    pub async fn toggle(&self, session: &ValidatedSession, film_id: &str) -> MiraResult<FavoriteState> {
        let film: Option<i64> = sqlx::query_scalar("SELECT 1 FROM films WHERE id = ?1")
            .bind(film_id)
            .fetch_optional(&self.db)
            .await?;
        if film.is_none() {
            return Err(MiraError::NotFound(format!("Film not found: {}", film_id)));
        }

        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ?1 AND film_id = ?2")
            .bind(&session.user_id)
            .bind(film_id)
            .execute(&mut *tx)
            .await?;

        let favorited = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO favorites (id, user_id, film_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, film_id) DO NOTHING",
            )
            .bind(db::new_id())
            .bind(&session.user_id)
            .bind(film_id)
            .bind(db::timestamp(Utc::now()))
            .execute(&mut *tx)
            .await?;
            true
        };

        tx.commit().await?;

        tracing::debug!(film_id = %film_id, user_id = %session.user_id, favorited, "favorite toggled");

        Ok(FavoriteState { favorited })
    }

    /// The caller's favorite films, most recently added first
    pub async fn list_for_user(&self, session: &ValidatedSession) -> MiraResult<Vec<Film>> {
        let films = sqlx::query_as::<_, Film>(
            r#"
            SELECT f.id, f.title, f.description, f.thumbnail_url, f.video_url, f.video_asset_id,
                   f.duration, f.category, f.tags, f.visibility, f.views, f.likes, f.director,
                   f.year, f.language, f.trailer_url, f.trailer_asset_id, f.bts_url,
                   f.bts_asset_id, f.bts_thumbnail_url, f.bts_duration, f.created_at, f.updated_at
            FROM favorites fav
            JOIN films f ON f.id = fav.film_id
            WHERE fav.user_id = ?1
            ORDER BY fav.created_at DESC, fav.rowid DESC
            "#,
        )
        .bind(&session.user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{FilmInput, FilmManager},
        db::models::UserRole,
    };

    async fn setup() -> (FavoriteManager, FilmManager, ValidatedSession) {
        let pool = db::create_memory_pool().await.unwrap();
        let user_id = db::new_id();
        sqlx::query("INSERT INTO users (id, name, role, created_at) VALUES (?1, 'Fan', 'USER', ?2)")
            .bind(&user_id)
            .bind(db::timestamp(Utc::now()))
            .execute(&pool)
            .await
            .unwrap();
        (
            FavoriteManager::new(pool.clone()),
            FilmManager::new(pool),
            ValidatedSession {
                user_id,
                role: UserRole::User,
            },
        )
    }

    #[tokio::test]
    async fn test_toggle_twice() {
        let (favorites, films, session) = setup().await;
        let film = films
            .create(FilmInput {
                title: "Keeper".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(favorites.toggle(&session, &film.id).await.unwrap().favorited);
        assert!(favorites.is_favorited(Some(&session), &film.id).await.unwrap().favorited);
        assert_eq!(favorites.list_for_user(&session).await.unwrap().len(), 1);

        assert!(!favorites.toggle(&session, &film.id).await.unwrap().favorited);
        assert!(!favorites.is_favorited(Some(&session), &film.id).await.unwrap().favorited);
        assert!(favorites.list_for_user(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_is_never_favorited() {
        let (favorites, _, _) = setup().await;
        let state = favorites.is_favorited(None, "whatever").await.unwrap();
        assert!(!state.favorited);
    }

    #[tokio::test]
    async fn test_toggle_missing_film() {
        let (favorites, _, session) = setup().await;
        assert!(matches!(
            favorites.toggle(&session, "missing").await,
            Err(MiraError::NotFound(_))
        ));
    }
}
