/// Comment mutations: post, like toggle, delete, report
use super::{CommentNode, CommentTreeBuilder, LikeState};
use crate::{
    account::ValidatedSession,
    db::{self, models::{Comment, Report}},
    error::{MiraError, MiraResult},
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

/// Body of a new comment or reply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: Option<String>,
    pub parent_id: Option<String>,
}

/// Comment mutation service
#[derive(Clone)]
pub struct CommentService {
    db: SqlitePool,
    tree: CommentTreeBuilder,
}

impl CommentService {
    pub fn new(db: SqlitePool) -> Self {
        let tree = CommentTreeBuilder::new(db.clone());
        Self { db, tree }
    }

    pub fn tree(&self) -> &CommentTreeBuilder {
        &self.tree
    }

    pub async fn get(&self, comment_id: &str) -> MiraResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, content, user_id, film_id, parent_id, created_at FROM comments WHERE id = ?1",
        )
        .bind(comment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| MiraError::NotFound(format!("Comment not found: {}", comment_id)))
    }

    /// Post a top-level comment or a reply.
    ///
    /// A reply to a reply is stored under the thread's top-level comment, so
    /// threads never grow past two levels. The parent must belong to the same
    /// film.
    pub async fn post(
        &self,
        session: &ValidatedSession,
        film_id: &str,
        input: NewComment,
    ) -> MiraResult<CommentNode> {
        // Blank means missing, but the text is stored as submitted
        let content = input
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MiraError::Validation("Content is required".to_string()))?;

        let film: Option<i64> = sqlx::query_scalar("SELECT 1 FROM films WHERE id = ?1")
            .bind(film_id)
            .fetch_optional(&self.db)
            .await?;
        if film.is_none() {
            return Err(MiraError::NotFound(format!("Film not found: {}", film_id)));
        }

        let parent_id = match input.parent_id.as_deref().filter(|p| !p.is_empty()) {
            Some(parent_id) => Some(self.thread_root(film_id, parent_id).await?),
            None => None,
        };

        let id = db::new_id();
        sqlx::query(
            "INSERT INTO comments (id, content, user_id, film_id, parent_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(&content)
        .bind(&session.user_id)
        .bind(film_id)
        .bind(&parent_id)
        .bind(db::timestamp(Utc::now()))
        .execute(&self.db)
        .await?;

        tracing::info!(
            comment_id = %id,
            film_id = %film_id,
            user_id = %session.user_id,
            reply = parent_id.is_some(),
            "comment posted"
        );

        self.tree.node(&id).await
    }

    /// Resolve the top-level comment a new reply should hang under
    async fn thread_root(&self, film_id: &str, parent_id: &str) -> MiraResult<String> {
        let parent = match self.get(parent_id).await {
            Ok(parent) => parent,
            Err(MiraError::NotFound(_)) => {
                return Err(MiraError::Validation("Parent comment not found".to_string()))
            }
            Err(e) => return Err(e),
        };

        if parent.film_id != film_id {
            return Err(MiraError::Validation(
                "Parent comment belongs to a different film".to_string(),
            ));
        }

        Ok(parent.parent_id.unwrap_or(parent.id))
    }

    /// Flip the caller's like on a comment
    pub async fn toggle_like(
        &self,
        session: &ValidatedSession,
        comment_id: &str,
    ) -> MiraResult<LikeState> {
        self.get(comment_id).await?;

        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM comment_likes WHERE user_id = ?1 AND comment_id = ?2")
            .bind(&session.user_id)
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO comment_likes (id, user_id, comment_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, comment_id) DO NOTHING",
            )
            .bind(db::new_id())
            .bind(&session.user_id)
            .bind(comment_id)
            .bind(db::timestamp(Utc::now()))
            .execute(&mut *tx)
            .await?;
            true
        };

        tx.commit().await?;

        tracing::debug!(comment_id = %comment_id, user_id = %session.user_id, liked, "like toggled");

        Ok(LikeState { liked })
    }

    /// Delete a comment as its author or an admin.
    ///
    /// Replies, likes and reports go with it.
    pub async fn delete(&self, session: &ValidatedSession, comment_id: &str) -> MiraResult<Comment> {
        let comment = self.get(comment_id).await?;

        let is_owner = comment.user_id == session.user_id;
        if !is_owner && !session.is_admin() {
            tracing::warn!(
                comment_id = %comment_id,
                user_id = %session.user_id,
                "refused comment deletion by non-owner"
            );
            return Err(MiraError::Forbidden(
                "Only the author or an admin can delete this comment".to_string(),
            ));
        }

        sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(comment_id)
            .execute(&self.db)
            .await?;

        tracing::info!(
            comment_id = %comment_id,
            user_id = %session.user_id,
            by_admin = !is_owner,
            "comment deleted"
        );

        Ok(comment)
    }

    /// File a report against a comment; repeated reports are kept
    pub async fn report(
        &self,
        session: &ValidatedSession,
        comment_id: &str,
        reason: Option<&str>,
    ) -> MiraResult<Report> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| MiraError::Validation("Reason is required".to_string()))?;

        self.get(comment_id).await?;

        let id = db::new_id();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO reports (id, reason, user_id, comment_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(reason)
        .bind(&session.user_id)
        .bind(comment_id)
        .bind(db::timestamp(now))
        .execute(&self.db)
        .await?;

        tracing::info!(report_id = %id, comment_id = %comment_id, "comment reported");

        Ok(Report {
            id,
            reason: reason.to_string(),
            user_id: session.user_id.clone(),
            comment_id: comment_id.to_string(),
            created_at: now,
        })
    }
}
