/// Report moderation queue
use crate::{
    account::ValidatedSession,
    auth::require_admin,
    comments::CommentService,
    db::models::Comment,
    error::MiraResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Who filed the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterSummary {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Author of the reported comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedComment {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub film_id: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
    pub film: FilmSummary,
}

/// An open report joined with its reporter, comment and film
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub reason: String,
    pub user_id: String,
    pub comment_id: String,
    pub created_at: DateTime<Utc>,
    pub user: ReporterSummary,
    pub comment: ReportedComment,
}

#[derive(FromRow)]
struct ReportRow {
    id: String,
    reason: String,
    user_id: String,
    comment_id: String,
    created_at: DateTime<Utc>,
    reporter_name: Option<String>,
    reporter_email: Option<String>,
    comment_content: String,
    comment_user_id: String,
    comment_parent_id: Option<String>,
    comment_created_at: DateTime<Utc>,
    author_name: Option<String>,
    author_image: Option<String>,
    film_id: String,
    film_title: String,
}

impl From<ReportRow> for ReportView {
    fn from(r: ReportRow) -> Self {
        ReportView {
            id: r.id,
            reason: r.reason,
            user_id: r.user_id,
            comment: ReportedComment {
                id: r.comment_id.clone(),
                content: r.comment_content,
                user_id: r.comment_user_id,
                film_id: r.film_id.clone(),
                parent_id: r.comment_parent_id,
                created_at: r.comment_created_at,
                user: CommentAuthor {
                    name: r.author_name,
                    image: r.author_image,
                },
                film: FilmSummary {
                    id: r.film_id,
                    title: r.film_title,
                },
            },
            comment_id: r.comment_id,
            created_at: r.created_at,
            user: ReporterSummary {
                name: r.reporter_name,
                email: r.reporter_email,
            },
        }
    }
}

/// Moderation queue over comment reports.
///
/// A report has no status of its own: it exists until its comment is
/// deleted, which removes it with the comment.
#[derive(Clone)]
pub struct ReportManager {
    db: SqlitePool,
    comments: CommentService,
}

impl ReportManager {
    pub fn new(db: SqlitePool, comments: CommentService) -> Self {
        Self { db, comments }
    }

    /// Every open report, newest first
    pub async fn list_reports(&self, session: &ValidatedSession) -> MiraResult<Vec<ReportView>> {
        require_admin(session)?;

        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT r.id, r.reason, r.user_id, r.comment_id, r.created_at,
                   reporter.name AS reporter_name, reporter.email AS reporter_email,
                   c.content AS comment_content, c.user_id AS comment_user_id,
                   c.parent_id AS comment_parent_id, c.created_at AS comment_created_at,
                   author.name AS author_name, author.image AS author_image,
                   f.id AS film_id, f.title AS film_title
            FROM reports r
            JOIN users reporter ON reporter.id = r.user_id
            JOIN comments c ON c.id = r.comment_id
            JOIN users author ON author.id = c.user_id
            JOIN films f ON f.id = c.film_id
            ORDER BY r.created_at DESC, r.rowid DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ReportView::from).collect())
    }

    /// Number of open reports
    pub async fn open_count(&self, session: &ValidatedSession) -> MiraResult<i64> {
        require_admin(session)?;

        let count = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    /// Remove a reported comment; its reports go with it
    pub async fn delete_comment(
        &self,
        session: &ValidatedSession,
        comment_id: &str,
    ) -> MiraResult<Comment> {
        require_admin(session)?;

        self.comments.delete(session, comment_id).await
    }
}
