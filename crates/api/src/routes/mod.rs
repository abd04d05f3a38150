pub mod health;
pub mod opportunity;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /opportunities               list, create
/// /opportunities/similar       rank closed deals against a draft (POST)
/// /opportunities/{id}          get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/opportunities", opportunity::router())
}
