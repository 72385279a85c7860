/// Moderation endpoints
use crate::{
    admin::ReportView,
    auth::AdminAuthContext,
    context::AppContext,
    db::models::Comment,
    error::MiraResult,
};
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/reports", get(list_reports))
        .route("/admin/reports/count", get(open_report_count))
        .route("/admin/comments/:id", delete(delete_comment))
}

async fn list_reports(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> MiraResult<Json<Vec<ReportView>>> {
    Ok(Json(ctx.reports.list_reports(&auth.session).await?))
}

async fn open_report_count(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> MiraResult<Json<serde_json::Value>> {
    let count = ctx.reports.open_count(&auth.session).await?;
    Ok(Json(json!({ "count": count })))
}

async fn delete_comment(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(comment_id): Path<String>,
) -> MiraResult<Json<Comment>> {
    Ok(Json(
        ctx.reports.delete_comment(&auth.session, &comment_id).await?,
    ))
}
