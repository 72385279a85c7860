/// Collection endpoints
use crate::{
    auth::AdminAuthContext,
    catalog::{CollectionInput, CollectionPatch, CollectionWithFilms},
    context::AppContext,
    db::models::{Collection, CollectionFilm},
    error::MiraResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/:id",
            get(get_collection)
                .patch(update_collection)
                .delete(delete_collection),
        )
        .route("/collections/:id/films", post(add_film))
        .route("/collections/:id/films/:film_id", delete(remove_film))
}

async fn list_collections(
    State(ctx): State<AppContext>,
) -> MiraResult<Json<Vec<CollectionWithFilms>>> {
    Ok(Json(ctx.collections.list().await?))
}

async fn get_collection(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> MiraResult<Json<CollectionWithFilms>> {
    Ok(Json(ctx.collections.get(&id).await?))
}

async fn create_collection(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(input): Json<CollectionInput>,
) -> MiraResult<Json<Collection>> {
    Ok(Json(ctx.collections.create(input).await?))
}

async fn update_collection(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(patch): Json<CollectionPatch>,
) -> MiraResult<Json<Collection>> {
    Ok(Json(ctx.collections.update(&id, patch).await?))
}

async fn delete_collection(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> MiraResult<StatusCode> {
    ctx.collections.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFilmRequest {
    film_id: String,
    #[serde(default)]
    order: i64,
}

async fn add_film(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<AddFilmRequest>,
) -> MiraResult<Json<CollectionFilm>> {
    Ok(Json(
        ctx.collections.add_film(&id, &req.film_id, req.order).await?,
    ))
}

async fn remove_film(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path((id, film_id)): Path<(String, String)>,
) -> MiraResult<StatusCode> {
    ctx.collections.remove_film(&id, &film_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
