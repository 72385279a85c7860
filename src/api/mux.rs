/// Video host import endpoints (admin only)
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    error::MiraResult,
    video_host::{AnnotatedAsset, UploadStatus, UploadTicket},
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/mux/assets", get(list_assets).delete(delete_asset))
        .route("/mux/upload", post(create_upload))
        .route("/mux/upload/:id", get(upload_status))
}

async fn list_assets(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> MiraResult<Json<Vec<AnnotatedAsset>>> {
    Ok(Json(ctx.assets.list_assets(&auth.session).await?))
}

#[derive(Debug, Deserialize)]
struct DeleteAssetQuery {
    id: Option<String>,
}

async fn delete_asset(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Query(query): Query<DeleteAssetQuery>,
) -> MiraResult<Json<serde_json::Value>> {
    ctx.assets
        .delete_asset(&auth.session, query.id.as_deref())
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Default, Deserialize)]
struct UploadRequest {
    #[serde(default)]
    title: Option<String>,
}

/// The body is optional; an empty or unparsable one means "no title"
async fn create_upload(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    body: Bytes,
) -> MiraResult<Json<UploadTicket>> {
    let req: UploadRequest = serde_json::from_slice(&body).unwrap_or_default();

    Ok(Json(
        ctx.assets
            .issue_upload(&auth.session, req.title.as_deref())
            .await?,
    ))
}

async fn upload_status(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(upload_id): Path<String>,
) -> MiraResult<Json<UploadStatus>> {
    Ok(Json(ctx.assets.poll_upload(&auth.session, &upload_id).await?))
}
