/// Threaded comments
///
/// Comments are stored flat with an optional parent id. The tree handed to
/// clients is always two levels deep: top-level comments, newest first, each
/// with its replies in insertion order. Likes are join rows whose existence
/// is the liked state.

mod service;
mod tree;

pub use service::{CommentService, NewComment};
pub use tree::{assemble, CommentRow, CommentTreeBuilder};

use crate::db::models::{AuthorSummary, CommentLike};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One node of the comment tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub film_id: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: AuthorSummary,
    pub likes: Vec<CommentLike>,
    pub replies: Vec<CommentNode>,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
}
