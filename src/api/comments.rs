/// Comment thread endpoints
use crate::{
    auth::AuthContext,
    comments::{CommentNode, LikeState, NewComment},
    context::AppContext,
    db::models::{Comment, Report},
    error::MiraResult,
};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/films/:id/comments", get(list_comments).post(post_comment))
        .route("/comments/:id", delete(delete_comment))
        .route("/comments/:id/like", post(toggle_like))
        .route("/comments/:id/report", post(report_comment))
}

async fn list_comments(
    State(ctx): State<AppContext>,
    Path(film_id): Path<String>,
) -> MiraResult<Json<Vec<CommentNode>>> {
    Ok(Json(ctx.comments.tree().build(&film_id).await?))
}

async fn post_comment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(film_id): Path<String>,
    Json(input): Json<NewComment>,
) -> MiraResult<Json<CommentNode>> {
    Ok(Json(ctx.comments.post(&auth.session, &film_id, input).await?))
}

async fn delete_comment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(comment_id): Path<String>,
) -> MiraResult<Json<Comment>> {
    Ok(Json(ctx.comments.delete(&auth.session, &comment_id).await?))
}

async fn toggle_like(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(comment_id): Path<String>,
) -> MiraResult<Json<LikeState>> {
    Ok(Json(
        ctx.comments.toggle_like(&auth.session, &comment_id).await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
struct ReportRequest {
    #[serde(default)]
    reason: Option<String>,
}

async fn report_comment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(comment_id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> MiraResult<Json<Report>> {
    Ok(Json(
        ctx.comments
            .report(&auth.session, &comment_id, req.reason.as_deref())
            .await?,
    ))
}
