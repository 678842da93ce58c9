//! HTTP route handlers.

mod auth;
mod orders;
mod products;

use axum::Router;

use crate::state::AppState;

/// All application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(orders::routes())
        .merge(auth::routes())
}
