//! Repository for the `opportunities` table.

use dealflow_core::opportunity::{STAGE_CLOSED_LOST, STAGE_CLOSED_WON, STAGE_LEAD};
use dealflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::opportunity::{CreateOpportunity, Opportunity, UpdateOpportunity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, client_id, client_name, contact_id, contact_name, \
    estimated_value, currency, probability, stage, source, description, \
    expected_close_date, actual_close_date, loss_reason, created_at, updated_at";

/// Provides CRUD operations and the closed-deal history query.
pub struct OpportunityRepo;

impl OpportunityRepo {
    /// Insert a new opportunity, returning the created row.
    ///
    /// `client_id` defaults to the empty string, `estimated_value` and
    /// `probability` to 0, and `stage` to `lead` when omitted.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOpportunity,
    ) -> Result<Opportunity, sqlx::Error> {
        let query = format!(
            "INSERT INTO opportunities
                (title, client_id, client_name, contact_id, contact_name,
                 estimated_value, currency, probability, stage, source,
                 description, expected_close_date, actual_close_date, loss_reason)
             VALUES ($1, COALESCE($2, ''), $3, $4, $5,
                 COALESCE($6, 0), $7, COALESCE($8, 0), COALESCE($9, '{STAGE_LEAD}'), $10,
                 $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Opportunity>(&query)
            .bind(&input.title)
            .bind(&input.client_id)
            .bind(&input.client_name)
            .bind(&input.contact_id)
            .bind(&input.contact_name)
            .bind(input.estimated_value)
            .bind(&input.currency)
            .bind(input.probability)
            .bind(&input.stage)
            .bind(&input.source)
            .bind(&input.description)
            .bind(input.expected_close_date)
            .bind(input.actual_close_date)
            .bind(&input.loss_reason)
            .fetch_one(pool)
            .await
    }

    /// Find an opportunity by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Opportunity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM opportunities WHERE id = $1");
        sqlx::query_as::<_, Opportunity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List opportunities ordered by most recently created first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Opportunity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM opportunities
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Opportunity>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List opportunities in a given pipeline stage, most recent first.
    pub async fn list_by_stage(
        pool: &PgPool,
        stage: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Opportunity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM opportunities
             WHERE stage = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Opportunity>(&query)
            .bind(stage)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an opportunity. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOpportunity,
    ) -> Result<Option<Opportunity>, sqlx::Error> {
        let query = format!(
            "UPDATE opportunities SET
                title               = COALESCE($2, title),
                client_id           = COALESCE($3, client_id),
                client_name         = COALESCE($4, client_name),
                contact_id          = COALESCE($5, contact_id),
                contact_name        = COALESCE($6, contact_name),
                estimated_value     = COALESCE($7, estimated_value),
                currency            = COALESCE($8, currency),
                probability         = COALESCE($9, probability),
                stage               = COALESCE($10, stage),
                source              = COALESCE($11, source),
                description         = COALESCE($12, description),
                expected_close_date = COALESCE($13, expected_close_date),
                actual_close_date   = COALESCE($14, actual_close_date),
                loss_reason         = COALESCE($15, loss_reason),
                updated_at          = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Opportunity>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.client_id)
            .bind(&input.client_name)
            .bind(&input.contact_id)
            .bind(&input.contact_name)
            .bind(input.estimated_value)
            .bind(&input.currency)
            .bind(input.probability)
            .bind(&input.stage)
            .bind(&input.source)
            .bind(&input.description)
            .bind(input.expected_close_date)
            .bind(input.actual_close_date)
            .bind(&input.loss_reason)
            .fetch_optional(pool)
            .await
    }

    /// Delete an opportunity by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Closed deals usable as comparison history: closed stage, recorded
    /// close date, positive value; most recently closed first, capped at
    /// `limit`. The similarity engine re-checks eligibility on whatever
    /// this returns.
    pub async fn list_closed(pool: &PgPool, limit: i64) -> Result<Vec<Opportunity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM opportunities
             WHERE stage IN ('{STAGE_CLOSED_WON}', '{STAGE_CLOSED_LOST}')
               AND actual_close_date IS NOT NULL
               AND estimated_value > 0
             ORDER BY actual_close_date DESC
             LIMIT $1"
        );
        let rows = sqlx::query_as::<_, Opportunity>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        tracing::debug!(count = rows.len(), limit, "closed-deal history fetched");
        Ok(rows)
    }
}
