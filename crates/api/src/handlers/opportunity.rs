//! Handlers for the `/opportunities` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dealflow_core::error::CoreError;
use dealflow_core::opportunity::{
    validate_estimated_value, validate_probability, validate_source, validate_stage,
};
use dealflow_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use dealflow_core::types::DbId;
use dealflow_db::models::opportunity::{CreateOpportunity, Opportunity, UpdateOpportunity};
use dealflow_db::repositories::OpportunityRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for the list endpoint
/// (`?limit=&offset=&stage=`).
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Restrict the listing to a single pipeline stage.
    pub stage: Option<String>,
}

/// POST /api/v1/opportunities
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateOpportunity>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Opportunity>>)> {
    let Json(input) = payload?;

    if let Some(stage) = input.stage.as_deref() {
        validate_stage(stage)?;
    }
    if let Some(source) = input.source.as_deref() {
        validate_source(source)?;
    }
    if let Some(probability) = input.probability {
        validate_probability(probability)?;
    }
    if let Some(value) = input.estimated_value {
        validate_estimated_value(value)?;
    }

    let opportunity = OpportunityRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(opportunity))))
}

/// GET /api/v1/opportunities
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Opportunity>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let opportunities = match params.stage.as_deref() {
        Some(stage) => {
            validate_stage(stage)?;
            OpportunityRepo::list_by_stage(&state.pool, stage, limit, offset).await?
        }
        None => OpportunityRepo::list(&state.pool, limit, offset).await?,
    };

    Ok(Json(ApiResponse::ok(opportunities)))
}

/// GET /api/v1/opportunities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Opportunity>>> {
    let opportunity = OpportunityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Opportunity",
            id,
        }))?;
    Ok(Json(ApiResponse::ok(opportunity)))
}

/// PUT /api/v1/opportunities/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateOpportunity>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Opportunity>>> {
    let Json(input) = payload?;

    if let Some(stage) = input.stage.as_deref() {
        validate_stage(stage)?;
    }
    if let Some(source) = input.source.as_deref() {
        validate_source(source)?;
    }
    if let Some(probability) = input.probability {
        validate_probability(probability)?;
    }
    if let Some(value) = input.estimated_value {
        validate_estimated_value(value)?;
    }

    let opportunity = OpportunityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Opportunity",
            id,
        }))?;
    Ok(Json(ApiResponse::ok(opportunity)))
}

/// DELETE /api/v1/opportunities/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = OpportunityRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Opportunity",
            id,
        }))
    }
}
