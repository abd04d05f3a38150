//! Opportunity entity model and DTOs.

use dealflow_core::opportunity::{Source, Stage};
use dealflow_core::similarity::{CandidateDeal, HistoricalDeal};
use dealflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An opportunity row from the `opportunities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Opportunity {
    pub id: DbId,
    pub title: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub contact_id: Option<String>,
    pub contact_name: Option<String>,
    pub estimated_value: f64,
    pub currency: Option<String>,
    pub probability: i32,
    pub stage: String,
    pub source: Option<String>,
    pub description: Option<String>,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub loss_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Opportunity {
    /// View this row as comparison material for the similarity engine.
    ///
    /// Returns `None` when the stored stage string no longer parses; such
    /// rows are skipped rather than guessed at. An unparseable source only
    /// degrades that one dimension to "missing".
    pub fn as_history(&self) -> Option<HistoricalDeal> {
        let stage = Stage::parse(&self.stage)?;
        Some(HistoricalDeal {
            id: self.id,
            title: Some(self.title.clone()),
            client_id: Some(self.client_id.clone()),
            client_name: self.client_name.clone(),
            estimated_value: Some(self.estimated_value),
            currency: self.currency.clone(),
            probability: Some(self.probability),
            stage,
            source: self.source.as_deref().and_then(Source::parse),
            description: self.description.clone(),
            expected_close_date: self.expected_close_date,
            actual_close_date: self.actual_close_date,
            created_at: Some(self.created_at),
            loss_reason: self.loss_reason.clone(),
        })
    }
}

/// DTO for creating a new opportunity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOpportunity {
    pub title: String,
    /// Defaults to the empty string if omitted.
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub contact_id: Option<String>,
    pub contact_name: Option<String>,
    /// Defaults to 0 if omitted.
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    /// Defaults to 0 if omitted.
    pub probability: Option<i32>,
    /// Defaults to `lead` if omitted.
    pub stage: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub loss_reason: Option<String>,
}

/// DTO for updating an existing opportunity. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOpportunity {
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub contact_id: Option<String>,
    pub contact_name: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub stage: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub loss_reason: Option<String>,
}

/// Request body for a similar-deals query: a draft opportunity straight
/// from the form, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarDealsRequest {
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub contact_id: Option<String>,
    pub contact_name: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub source: Option<String>,
    pub expected_close_date: Option<Timestamp>,
    pub description: Option<String>,
}

impl SimilarDealsRequest {
    /// Convert the request into engine input. An unrecognized source string
    /// is treated as missing rather than rejected; contact fields and
    /// probability play no part in scoring and are dropped here.
    pub fn into_candidate(self) -> CandidateDeal {
        CandidateDeal {
            title: self.title,
            client_id: self.client_id,
            client_name: self.client_name,
            estimated_value: self.estimated_value,
            currency: self.currency,
            source: self.source.as_deref().and_then(Source::parse),
            expected_close_date: self.expected_close_date,
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn row() -> Opportunity {
        Opportunity {
            id: 1,
            title: "Enterprise rollout".into(),
            client_id: "C1".into(),
            client_name: Some("Acme Corp".into()),
            contact_id: None,
            contact_name: None,
            estimated_value: 100_000.0,
            currency: Some("USD".into()),
            probability: 90,
            stage: "closed_won".into(),
            source: Some("inbound".into()),
            description: Some("enterprise reference deal".into()),
            expected_close_date: None,
            actual_close_date: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
            loss_reason: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn as_history_maps_parsed_fields() {
        let deal = row().as_history().unwrap();
        assert_eq!(deal.id, 1);
        assert_eq!(deal.stage, Stage::ClosedWon);
        assert_eq!(deal.source, Some(Source::Inbound));
        assert_eq!(deal.estimated_value, Some(100_000.0));
        assert_eq!(deal.client_id.as_deref(), Some("C1"));
    }

    #[test]
    fn as_history_skips_unknown_stage() {
        let mut bad = row();
        bad.stage = "archived".into();
        assert_matches!(bad.as_history(), None);
    }

    #[test]
    fn as_history_degrades_unknown_source_to_missing() {
        let mut odd = row();
        odd.source = Some("carrier_pigeon".into());
        let deal = odd.as_history().unwrap();
        assert_eq!(deal.source, None);
    }

    #[test]
    fn into_candidate_parses_source_and_drops_contact_fields() {
        let request = SimilarDealsRequest {
            client_id: Some("C1".into()),
            contact_id: Some("P9".into()),
            probability: Some(55),
            source: Some("referral".into()),
            ..SimilarDealsRequest::default()
        };

        let candidate = request.into_candidate();
        assert_eq!(candidate.client_id.as_deref(), Some("C1"));
        assert_eq!(candidate.source, Some(Source::Referral));
    }

    #[test]
    fn into_candidate_treats_unknown_source_as_missing() {
        let request = SimilarDealsRequest {
            source: Some("billboard".into()),
            ..SimilarDealsRequest::default()
        };
        assert_eq!(request.into_candidate().source, None);
    }
}
