/// Film library endpoints
use crate::{
    auth::{AdminAuthContext, OptionalAuthContext},
    catalog::{FilmInput, FilmPatch},
    context::AppContext,
    db::models::Film,
    error::MiraResult,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

const TRENDING_LIMIT: i64 = 10;
const RELATED_LIMIT: i64 = 4;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/films", get(list_films).post(create_film))
        .route(
            "/films/:id",
            get(get_film).patch(update_film).delete(delete_film),
        )
        .route("/films/:id/view", post(record_view))
        .route("/films/:id/related", get(related_films))
        .route("/trending", get(trending_films))
        .route("/search", get(search_films))
}

/// Admins see private films too
fn sees_private(auth: &OptionalAuthContext) -> bool {
    auth.session.as_ref().is_some_and(|s| s.is_admin())
}

async fn list_films(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
) -> MiraResult<Json<Vec<Film>>> {
    Ok(Json(ctx.films.list(sees_private(&auth)).await?))
}

async fn get_film(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
    Path(id): Path<String>,
) -> MiraResult<Json<Film>> {
    Ok(Json(ctx.films.get_visible(&id, sees_private(&auth)).await?))
}

async fn create_film(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(input): Json<FilmInput>,
) -> MiraResult<Json<Film>> {
    Ok(Json(ctx.films.create(input).await?))
}

async fn update_film(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(patch): Json<FilmPatch>,
) -> MiraResult<Json<Film>> {
    Ok(Json(ctx.films.update(&id, patch).await?))
}

async fn delete_film(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> MiraResult<StatusCode> {
    ctx.films.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_view(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MiraResult<Json<serde_json::Value>> {
    ctx.films.record_view(&id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn related_films(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MiraResult<Json<Vec<Film>>> {
    Ok(Json(ctx.films.related(&id, RELATED_LIMIT).await?))
}

async fn trending_films(State(ctx): State<AppContext>) -> MiraResult<Json<Vec<Film>>> {
    Ok(Json(ctx.films.trending(TRENDING_LIMIT).await?))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_films(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
    Query(query): Query<SearchQuery>,
) -> MiraResult<Json<Vec<Film>>> {
    Ok(Json(ctx.films.search(&query.q, sees_private(&auth)).await?))
}
