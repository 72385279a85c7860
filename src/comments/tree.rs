/// Comment tree assembly
use super::CommentNode;
use crate::{
    db::models::{AuthorSummary, CommentLike},
    error::{MiraError, MiraResult},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

const COMMENT_SELECT: &str = "SELECT c.id, c.content, c.user_id, c.film_id, c.parent_id, c.created_at,
            u.name AS author_name, u.image AS author_image
     FROM comments c
     JOIN users u ON u.id = c.user_id";

/// Comment joined with its author's public fields
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub film_id: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

impl CommentRow {
    fn into_node(self, likes: Vec<CommentLike>) -> CommentNode {
        CommentNode {
            user: AuthorSummary {
                id: self.user_id.clone(),
                name: self.author_name,
                image: self.author_image,
            },
            id: self.id,
            content: self.content,
            user_id: self.user_id,
            film_id: self.film_id,
            parent_id: self.parent_id,
            created_at: self.created_at,
            likes,
            replies: Vec::new(),
        }
    }
}

/// Build the two-level tree from already-fetched rows.
///
/// `top_level` keeps its order. Each reply lands under the top-level comment
/// named by its `parent_id`, in the order given; replies whose parent is not
/// among `top_level` are dropped.
pub fn assemble(
    top_level: Vec<CommentRow>,
    replies: Vec<CommentRow>,
    likes: Vec<CommentLike>,
) -> Vec<CommentNode> {
    let mut likes_by_comment: HashMap<String, Vec<CommentLike>> = HashMap::new();
    for like in likes {
        likes_by_comment
            .entry(like.comment_id.clone())
            .or_default()
            .push(like);
    }

    let mut replies_by_parent: HashMap<String, Vec<CommentNode>> = HashMap::new();
    for reply in replies {
        let Some(parent_id) = reply.parent_id.clone() else {
            continue;
        };
        let likes = likes_by_comment.remove(&reply.id).unwrap_or_default();
        replies_by_parent
            .entry(parent_id)
            .or_default()
            .push(reply.into_node(likes));
    }

    top_level
        .into_iter()
        .map(|row| {
            let likes = likes_by_comment.remove(&row.id).unwrap_or_default();
            let replies = replies_by_parent.remove(&row.id).unwrap_or_default();
            let mut node = row.into_node(likes);
            node.replies = replies;
            node
        })
        .collect()
}

/// Loads comment trees from the store
#[derive(Clone)]
pub struct CommentTreeBuilder {
    db: SqlitePool,
}

impl CommentTreeBuilder {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Top-level comments for a film, newest first, each with its replies.
    ///
    /// Three fixed queries regardless of thread size: top level, replies of
    /// that set, likes of both.
    pub async fn build(&self, film_id: &str) -> MiraResult<Vec<CommentNode>> {
        let top_level = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.film_id = ?1 AND c.parent_id IS NULL
             ORDER BY c.created_at DESC, c.rowid DESC",
            COMMENT_SELECT
        ))
        .bind(film_id)
        .fetch_all(&self.db)
        .await?;

        if top_level.is_empty() {
            return Ok(Vec::new());
        }

        let parent_ids: Vec<&str> = top_level.iter().map(|c| c.id.as_str()).collect();
        let replies = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.parent_id IN (SELECT value FROM json_each(?1))
             ORDER BY c.created_at ASC, c.rowid ASC",
            COMMENT_SELECT
        ))
        .bind(serde_json::to_string(&parent_ids).map_err(|e| MiraError::Internal(e.to_string()))?)
        .fetch_all(&self.db)
        .await?;

        let comment_ids: Vec<&str> = top_level
            .iter()
            .chain(replies.iter())
            .map(|c| c.id.as_str())
            .collect();
        let likes = self.likes_for(&comment_ids).await?;

        Ok(assemble(top_level, replies, likes))
    }

    /// A single comment in tree-node shape, with its direct replies
    pub async fn node(&self, comment_id: &str) -> MiraResult<CommentNode> {
        let row = sqlx::query_as::<_, CommentRow>(&format!("{} WHERE c.id = ?1", COMMENT_SELECT))
            .bind(comment_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| MiraError::NotFound(format!("Comment not found: {}", comment_id)))?;

        let replies = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.parent_id = ?1 ORDER BY c.created_at ASC, c.rowid ASC",
            COMMENT_SELECT
        ))
        .bind(comment_id)
        .fetch_all(&self.db)
        .await?;

        let mut ids: Vec<&str> = vec![row.id.as_str()];
        ids.extend(replies.iter().map(|r| r.id.as_str()));
        let likes = self.likes_for(&ids).await?;

        let mut nodes = assemble(vec![row], replies, likes);
        nodes
            .pop()
            .ok_or_else(|| MiraError::Internal("comment node vanished during assembly".to_string()))
    }

    async fn likes_for(&self, comment_ids: &[&str]) -> MiraResult<Vec<CommentLike>> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let likes = sqlx::query_as::<_, CommentLike>(
            "SELECT id, user_id, comment_id, created_at FROM comment_likes
             WHERE comment_id IN (SELECT value FROM json_each(?1))
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(serde_json::to_string(comment_ids).map_err(|e| MiraError::Internal(e.to_string()))?)
        .fetch_all(&self.db)
        .await?;

        Ok(likes)
    }
}
