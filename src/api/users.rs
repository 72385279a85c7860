/// Public profile endpoint
use crate::{account::UserProfile, context::AppContext, error::MiraResult};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/users/:id", get(get_profile))
}

async fn get_profile(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> MiraResult<Json<UserProfile>> {
    Ok(Json(ctx.accounts.get_profile(&user_id).await?))
}
