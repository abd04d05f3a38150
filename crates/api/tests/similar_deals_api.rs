//! HTTP-level integration tests for `POST /api/v1/opportunities/similar`.
//!
//! Seeds history through the public create endpoint, then exercises the
//! similarity ranking end to end: eligibility filtering, scoring, the
//! result cap, and the derived success/risk factors.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, post_json};
use serde_json::json;
use sqlx::PgPool;

/// Insert one opportunity through the API and return its id.
async fn seed(pool: &PgPool, body: serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/opportunities", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Query the similar-deals endpoint and return the parsed body.
async fn find_similar(pool: PgPool, candidate: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/opportunities/similar", candidate).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: empty history yields an empty result list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn no_history_returns_empty_list(pool: PgPool) {
    let body = find_similar(
        pool,
        json!({"estimated_value": 50000.0, "client_id": "C1"}),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: a strong match scores high and carries all four success factors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn strong_match_scores_high_with_success_factors(pool: PgPool) {
    // Closed 30 days after creation (created_at is set by the insert).
    let close_date = (Utc::now() + Duration::days(30)).to_rfc3339();

    let id = seed(
        &pool,
        json!({
            "title": "Enterprise rollout",
            "client_id": "C1",
            "client_name": "Acme Corp",
            "estimated_value": 100000.0,
            "currency": "USD",
            "probability": 90,
            "stage": "closed_won",
            "source": "inbound",
            "description": "enterprise reference deal for client",
            "actual_close_date": close_date
        }),
    )
    .await;

    let body = find_similar(
        pool,
        json!({
            "estimated_value": 100000.0,
            "client_id": "C1",
            "source": "inbound",
            "description": "enterprise reference deal"
        }),
    )
    .await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);

    // value 0.30 + client 0.25 + source 0.15 + description 0.75*0.15
    // + stage 0.8*0.10 = 0.8925 -> 89.
    let top = &data[0];
    assert_eq!(top["opportunity_id"], id);
    assert_eq!(top["similarity_score"], 89);
    assert_eq!(top["days_to_close"], 30);
    assert_eq!(top["client_name"], "Acme Corp");
    assert_eq!(top["stage"], "closed_won");
    assert_eq!(
        top["success_factors"],
        json!([
            "High probability assessment",
            "Successfully closed",
            "Quick close time",
            "Customer reference available"
        ])
    );
    assert_eq!(top["risk_factors"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: open, undated, and zero-value deals never appear
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ineligible_deals_are_never_returned(pool: PgPool) {
    let eligible = seed(
        &pool,
        json!({
            "title": "Eligible",
            "client_id": "C1",
            "estimated_value": 100000.0,
            "stage": "closed_won",
            "actual_close_date": "2024-01-31T00:00:00Z"
        }),
    )
    .await;

    // Identical numbers, but still in the pipeline.
    seed(
        &pool,
        json!({
            "title": "Still open",
            "client_id": "C1",
            "estimated_value": 100000.0,
            "stage": "negotiation",
            "actual_close_date": "2024-01-31T00:00:00Z"
        }),
    )
    .await;

    // Closed but never given a close date.
    seed(
        &pool,
        json!({
            "title": "Undated",
            "client_id": "C1",
            "estimated_value": 100000.0,
            "stage": "closed_won"
        }),
    )
    .await;

    // Closed with a close date, but worthless.
    seed(
        &pool,
        json!({
            "title": "Zero value",
            "client_id": "C1",
            "stage": "closed_won",
            "actual_close_date": "2024-01-31T00:00:00Z"
        }),
    )
    .await;

    let body = find_similar(
        pool,
        json!({"estimated_value": 100000.0, "client_id": "C1"}),
    )
    .await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["opportunity_id"], eligible);
}

// ---------------------------------------------------------------------------
// Test: at most three results, sorted by descending score
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn results_are_capped_and_sorted(pool: PgPool) {
    for value in [100000.0, 100000.0, 50000.0, 10000.0] {
        seed(
            &pool,
            json!({
                "title": "History",
                "client_id": "C1",
                "estimated_value": value,
                "stage": "closed_won",
                "actual_close_date": "2024-01-31T00:00:00Z"
            }),
        )
        .await;
    }

    let body = find_similar(
        pool,
        json!({"estimated_value": 100000.0, "client_id": "C1"}),
    )
    .await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);

    let scores: Vec<i64> = data
        .iter()
        .map(|r| r["similarity_score"].as_i64().unwrap())
        .collect();
    assert!(scores[0] >= scores[1] && scores[1] >= scores[2]);
    assert!(scores.iter().all(|s| (0..=100).contains(s)));
}

// ---------------------------------------------------------------------------
// Test: a blank candidate stays below the inclusion threshold
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_candidate_yields_no_matches(pool: PgPool) {
    seed(
        &pool,
        json!({
            "title": "Won",
            "client_id": "C1",
            "estimated_value": 100000.0,
            "stage": "closed_won",
            "actual_close_date": "2024-01-31T00:00:00Z"
        }),
    )
    .await;

    // Only the stage dimension can fire (0.8 * 0.10), which is below the cutoff.
    let body = find_similar(pool, json!({})).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: an unknown candidate source is ignored, not rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_candidate_source_is_ignored(pool: PgPool) {
    seed(
        &pool,
        json!({
            "title": "Won",
            "client_id": "C1",
            "estimated_value": 100000.0,
            "stage": "closed_won",
            "source": "inbound",
            "actual_close_date": "2024-01-31T00:00:00Z"
        }),
    )
    .await;

    let body = find_similar(
        pool,
        json!({
            "estimated_value": 100000.0,
            "client_id": "C1",
            "source": "smoke_signals"
        }),
    )
    .await;

    // The query succeeds; the source dimension simply contributes nothing:
    // value 0.30 + client 0.25 + stage 0.08 = 0.63 -> 63.
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["similarity_score"], 63);
}

// ---------------------------------------------------------------------------
// Test: a lost deal reports its risk factors in order
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lost_deal_reports_risk_factors(pool: PgPool) {
    // Closed 200 days after creation: an extended sales cycle.
    let close_date = (Utc::now() + Duration::days(200)).to_rfc3339();

    seed(
        &pool,
        json!({
            "title": "Lost deal",
            "client_id": "C9",
            "estimated_value": 5000.0,
            "probability": 20,
            "stage": "closed_lost",
            "loss_reason": "Budget cut",
            "actual_close_date": close_date
        }),
    )
    .await;

    let body = find_similar(pool, json!({"client_id": "C9"})).await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);

    // client 0.25 + stage 0.8*0.10 = 0.33 -> 33.
    let top = &data[0];
    assert_eq!(top["similarity_score"], 33);
    assert_eq!(top["days_to_close"], 200);
    assert_eq!(top["success_factors"], json!([]));
    assert_eq!(
        top["risk_factors"],
        json!([
            "Low probability assessment",
            "Deal was lost",
            "Extended sales cycle",
            "Loss reason: Budget cut"
        ])
    );
}

// ---------------------------------------------------------------------------
// Test: a structurally invalid body is rejected before the engine runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_candidate_body_gets_the_failure_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/opportunities/similar",
        json!({"estimated_value": "a lot"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].is_string());
}
