/// API routes and handlers
pub mod admin;
pub mod collections;
pub mod comments;
pub mod films;
pub mod mux;
pub mod users;
pub mod viewing;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(films::routes())
        .merge(collections::routes())
        .merge(comments::routes())
        .merge(viewing::routes())
        .merge(users::routes())
        .merge(admin::routes())
        .merge(mux::routes())
}
