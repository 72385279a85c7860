/// Per-viewer endpoints: resume points and favorites
use crate::{
    auth::{AuthContext, OptionalAuthContext},
    context::AppContext,
    db::models::{Film, WatchProgress},
    error::MiraResult,
    viewing::{FavoriteState, InProgressFilm, ProgressState, ProgressUpdate},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/films/:id/progress", get(get_progress).post(save_progress))
        .route("/films/:id/favorite", get(get_favorite).post(toggle_favorite))
        .route("/me/favorites", get(my_favorites))
        .route("/me/progress", get(continue_watching))
}

async fn get_progress(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(film_id): Path<String>,
) -> MiraResult<Json<ProgressState>> {
    Ok(Json(ctx.progress.get(&auth.session, &film_id).await?))
}

async fn save_progress(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(film_id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> MiraResult<Json<WatchProgress>> {
    Ok(Json(ctx.progress.save(&auth.session, &film_id, update).await?))
}

async fn get_favorite(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
    Path(film_id): Path<String>,
) -> MiraResult<Json<FavoriteState>> {
    Ok(Json(
        ctx.favorites
            .is_favorited(auth.session.as_ref(), &film_id)
            .await?,
    ))
}

async fn toggle_favorite(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(film_id): Path<String>,
) -> MiraResult<Json<FavoriteState>> {
    Ok(Json(ctx.favorites.toggle(&auth.session, &film_id).await?))
}

async fn my_favorites(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> MiraResult<Json<Vec<Film>>> {
    Ok(Json(ctx.favorites.list_for_user(&auth.session).await?))
}

async fn continue_watching(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> MiraResult<Json<Vec<InProgressFilm>>> {
    Ok(Json(ctx.progress.continue_watching(&auth.session).await?))
}
