//! Handler for the similar-deals endpoint.
//!
//! Accepts a draft opportunity straight from the form, fetches the closed
//! deal history, and delegates scoring to the pure engine in
//! `dealflow_core::similarity`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use dealflow_core::similarity::{self, SimilarDeal, HISTORY_FETCH_LIMIT};
use dealflow_db::models::opportunity::SimilarDealsRequest;
use dealflow_db::repositories::OpportunityRepo;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/opportunities/similar
///
/// The engine never fails on partial data: missing candidate fields and
/// unknown source strings degrade to zero-contribution dimensions. Only a
/// body that fails to deserialize or a failed history fetch errors here,
/// both through the standard failure envelope.
pub async fn find_similar(
    State(state): State<AppState>,
    payload: Result<Json<SimilarDealsRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Vec<SimilarDeal>>>> {
    let Json(request) = payload?;

    let rows = OpportunityRepo::list_closed(&state.pool, HISTORY_FETCH_LIMIT).await?;
    let history: Vec<_> = rows.iter().filter_map(|row| row.as_history()).collect();

    let candidate = request.into_candidate();
    let matches = similarity::find_similar_deals(&candidate, &history);

    tracing::debug!(
        history_count = history.len(),
        match_count = matches.len(),
        "Similar deals computed"
    );

    Ok(Json(ApiResponse::ok(matches)))
}
