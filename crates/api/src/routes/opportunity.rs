//! Route definitions for the `/opportunities` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{opportunity, similar_deals};
use crate::state::AppState;

/// Routes mounted at `/opportunities`.
///
/// ```text
/// GET    /           -> list
/// POST   /           -> create
/// POST   /similar    -> find_similar
/// GET    /{id}       -> get_by_id
/// PUT    /{id}       -> update
/// DELETE /{id}       -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(opportunity::list).post(opportunity::create))
        .route("/similar", post(similar_deals::find_similar))
        .route(
            "/{id}",
            get(opportunity::get_by_id)
                .put(opportunity::update)
                .delete(opportunity::delete),
        )
}
