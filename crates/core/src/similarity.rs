//! Deal similarity scoring and ranking.
//!
//! Compares a draft opportunity against closed historical deals and returns
//! the closest matches, each annotated with success and risk factors. Pure
//! domain logic — no database access, no I/O, no shared state; safe to call
//! concurrently from any number of request handlers.
//!
//! Every comparison dimension handles the "field missing on either side"
//! case with an explicit branch that contributes zero, so the engine is
//! total over its inputs and never fails on partial data.

use std::collections::HashSet;

use crate::opportunity::{Source, Stage};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Dimension weights (sum to 1.0)
// ---------------------------------------------------------------------------

/// Weight of deal-value closeness.
pub const VALUE_WEIGHT: f64 = 0.30;

/// Weight of client identity / client-name similarity.
pub const CLIENT_WEIGHT: f64 = 0.25;

/// Weight of acquisition-source equality.
pub const SOURCE_WEIGHT: f64 = 0.15;

/// Weight of description keyword overlap.
pub const DESCRIPTION_WEIGHT: f64 = 0.15;

/// Weight of the pipeline-stage heuristic.
pub const STAGE_WEIGHT: f64 = 0.10;

/// Weight of expected-close-date proximity.
pub const TIMEFRAME_WEIGHT: f64 = 0.05;

// ---------------------------------------------------------------------------
// Selection constants
// ---------------------------------------------------------------------------

/// Raw-score inclusion cutoff. A deal is returned only if its weighted
/// score in `[0, 1]` is strictly greater than this, checked before the
/// score is rounded to a percentage.
pub const MIN_SIMILARITY_SCORE: f64 = 0.1;

/// Maximum number of matches returned per query.
pub const MAX_RESULTS: usize = 3;

/// Upper bound on closed deals fetched from storage for one similarity query.
pub const HISTORY_FETCH_LIMIT: i64 = 1000;

// ---------------------------------------------------------------------------
// Scoring thresholds
// ---------------------------------------------------------------------------

/// Expected close dates at most this many days apart score full marks.
pub const TIMEFRAME_NEAR_DAYS: i64 = 90;

/// Expected close dates at most this many days apart score half marks.
pub const TIMEFRAME_FAR_DAYS: i64 = 180;

/// Descriptions are tokenized on whitespace; only tokens longer than this
/// many characters count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Factor thresholds and labels
// ---------------------------------------------------------------------------

/// Probability at or above this is flagged as a success factor.
pub const HIGH_PROBABILITY: i32 = 80;

/// Probability at or below this is flagged as a risk factor.
pub const LOW_PROBABILITY: i32 = 30;

/// Deals closed in fewer than this many days count as quick closes.
pub const QUICK_CLOSE_DAYS: i64 = 90;

/// Deals that took more than this many days to close count as extended cycles.
pub const EXTENDED_CYCLE_DAYS: i64 = 180;

/// Case-insensitive substring that marks a deal as having a customer reference.
pub const REFERENCE_KEYWORD: &str = "reference";

pub const FACTOR_HIGH_PROBABILITY: &str = "High probability assessment";
pub const FACTOR_CLOSED_WON: &str = "Successfully closed";
pub const FACTOR_QUICK_CLOSE: &str = "Quick close time";
pub const FACTOR_REFERENCE: &str = "Customer reference available";
pub const FACTOR_LOW_PROBABILITY: &str = "Low probability assessment";
pub const FACTOR_CLOSED_LOST: &str = "Deal was lost";
pub const FACTOR_EXTENDED_CYCLE: &str = "Extended sales cycle";
pub const FACTOR_LOSS_REASON_PREFIX: &str = "Loss reason: ";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// ---------------------------------------------------------------------------
// Engine inputs and output
// ---------------------------------------------------------------------------

/// A draft opportunity being shopped against history. Not yet persisted, so
/// every field may be absent; absent fields contribute zero to the score.
#[derive(Debug, Clone, Default)]
pub struct CandidateDeal {
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    pub source: Option<Source>,
    pub expected_close_date: Option<Timestamp>,
    pub description: Option<String>,
}

/// A persisted opportunity record used as comparison material.
///
/// Only records with a closed stage, a recorded actual close date, and a
/// positive value are ever scored (see [`is_eligible`]); everything else is
/// dropped before scoring.
#[derive(Debug, Clone)]
pub struct HistoricalDeal {
    pub id: DbId,
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub stage: Stage,
    pub source: Option<Source>,
    pub description: Option<String>,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub loss_reason: Option<String>,
}

/// One ranked match, with a snapshot of the historical record and the
/// derived presentation fields. Computed fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimilarDeal {
    pub opportunity_id: DbId,
    /// Rounded percentage in `[0, 100]`.
    pub similarity_score: i32,
    pub title: Option<String>,
    pub client_name: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: Option<String>,
    pub stage: Stage,
    pub source: Option<Source>,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub days_to_close: Option<i64>,
    pub description: Option<String>,
    pub success_factors: Vec<String>,
    pub risk_factors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Whether a historical record qualifies as comparison material: closed
/// stage, actual close date recorded, and a positive deal value.
pub fn is_eligible(deal: &HistoricalDeal) -> bool {
    deal.stage.is_closed()
        && deal.actual_close_date.is_some()
        && deal.estimated_value.is_some_and(|v| v > 0.0)
}

// ---------------------------------------------------------------------------
// Dimension scores (each in [0, 1])
// ---------------------------------------------------------------------------

/// Closeness of two deal values: `(1 - |a-b| / max(a, b))`, squared so that
/// large gaps are penalized super-linearly. Zero when either value is
/// missing, non-positive, or not finite.
pub fn value_score(candidate_value: Option<f64>, deal_value: Option<f64>) -> f64 {
    let (Some(a), Some(b)) = (candidate_value, deal_value) else {
        return 0.0;
    };
    if !a.is_finite() || !b.is_finite() || a <= 0.0 || b <= 0.0 {
        return 0.0;
    }

    let closeness = 1.0 - (a - b).abs() / a.max(b);
    closeness * closeness
}

/// Client match: identical non-empty client ids score 1.0 outright; failing
/// that, two present non-empty client names fall back to
/// [`string_similarity`]; anything else scores zero.
pub fn client_score(
    candidate_id: Option<&str>,
    candidate_name: Option<&str>,
    deal_id: Option<&str>,
    deal_name: Option<&str>,
) -> f64 {
    if let (Some(a), Some(b)) = (candidate_id, deal_id) {
        if !a.is_empty() && a == b {
            return 1.0;
        }
    }

    match (candidate_name, deal_name) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => string_similarity(a, b),
        _ => 0.0,
    }
}

/// Acquisition-source match: 1.0 when both sources are present and equal,
/// otherwise zero.
pub fn source_score(candidate_source: Option<Source>, deal_source: Option<Source>) -> f64 {
    match (candidate_source, deal_source) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}

/// Keyword overlap between two descriptions: case-insensitive whitespace
/// tokens longer than [`MIN_KEYWORD_CHARS`] characters, scored as
/// `|intersection| / |union|`. Zero when either description is missing or
/// either side yields no keywords.
pub fn description_score(candidate_desc: Option<&str>, deal_desc: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (candidate_desc, deal_desc) else {
        return 0.0;
    };

    let keywords_a = keywords(a);
    let keywords_b = keywords(b);
    if keywords_a.is_empty() || keywords_b.is_empty() {
        return 0.0;
    }

    let common = keywords_a.intersection(&keywords_b).count() as f64;
    let union = keywords_a.union(&keywords_b).count() as f64;
    common / union
}

fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Stage heuristic. The candidate is a draft and is always treated as being
/// at the lead stage: a historical deal still at lead would match exactly
/// (1.0), a closed deal scores 0.8, anything in between scores 0.5. Since
/// only closed deals pass [`is_eligible`], the exact-match branch never
/// fires in the ranking path; it is kept so the heuristic reads as the
/// whole table it is.
pub fn stage_score(deal_stage: Stage) -> f64 {
    if deal_stage == Stage::Lead {
        return 1.0;
    }
    if deal_stage.is_closed() {
        return 0.8;
    }
    0.5
}

/// Expected-close-date proximity: full marks within [`TIMEFRAME_NEAR_DAYS`]
/// days, half marks within [`TIMEFRAME_FAR_DAYS`], zero beyond that or when
/// either date is missing. Differences are measured in whole days.
pub fn timeframe_score(
    candidate_date: Option<Timestamp>,
    deal_date: Option<Timestamp>,
) -> f64 {
    let (Some(a), Some(b)) = (candidate_date, deal_date) else {
        return 0.0;
    };

    let days = (a - b).num_days().abs();
    if days <= TIMEFRAME_NEAR_DAYS {
        1.0
    } else if days <= TIMEFRAME_FAR_DAYS {
        0.5
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// String similarity (client-name fallback)
// ---------------------------------------------------------------------------

/// Heuristic name similarity: case-insensitive equality after trimming
/// scores 1.0, substring containment in either direction scores 0.8, and
/// everything else falls back to Jaccard similarity over the two distinct
/// character sets with whitespace stripped. Character frequency and order
/// are deliberately ignored; this is a coarse tie-breaker, not an edit
/// distance.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.8;
    }

    // Both strings are non-empty here: an empty side would have hit the
    // containment branch above.
    let chars_a: HashSet<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let chars_b: HashSet<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    let common = chars_a.intersection(&chars_b).count() as f64;
    let union = chars_a.union(&chars_b).count() as f64;
    common / union
}

// ---------------------------------------------------------------------------
// Composite score
// ---------------------------------------------------------------------------

/// Weighted sum of the six dimension scores, in `[0, 1]`.
pub fn score_deal(candidate: &CandidateDeal, deal: &HistoricalDeal) -> f64 {
    value_score(candidate.estimated_value, deal.estimated_value) * VALUE_WEIGHT
        + client_score(
            candidate.client_id.as_deref(),
            candidate.client_name.as_deref(),
            deal.client_id.as_deref(),
            deal.client_name.as_deref(),
        ) * CLIENT_WEIGHT
        + source_score(candidate.source, deal.source) * SOURCE_WEIGHT
        + description_score(candidate.description.as_deref(), deal.description.as_deref())
            * DESCRIPTION_WEIGHT
        + stage_score(deal.stage) * STAGE_WEIGHT
        + timeframe_score(candidate.expected_close_date, deal.expected_close_date)
            * TIMEFRAME_WEIGHT
}

// ---------------------------------------------------------------------------
// Derived presentation fields
// ---------------------------------------------------------------------------

/// Whole days from record creation to actual close, rounded up. `None` when
/// either timestamp is missing.
pub fn days_to_close(
    created_at: Option<Timestamp>,
    actual_close_date: Option<Timestamp>,
) -> Option<i64> {
    let (Some(created), Some(closed)) = (created_at, actual_close_date) else {
        return None;
    };

    let millis = (closed - created).num_milliseconds() as f64;
    Some((millis / MILLIS_PER_DAY).ceil() as i64)
}

/// Labels explaining what went right for a closed deal, in fixed order:
/// high probability, won, quick close, customer reference in the description.
pub fn success_factors(deal: &HistoricalDeal, days_to_close: Option<i64>) -> Vec<String> {
    let mut factors = Vec::new();

    if deal.probability.is_some_and(|p| p >= HIGH_PROBABILITY) {
        factors.push(FACTOR_HIGH_PROBABILITY.to_owned());
    }
    if deal.stage == Stage::ClosedWon {
        factors.push(FACTOR_CLOSED_WON.to_owned());
    }
    if days_to_close.is_some_and(|d| d < QUICK_CLOSE_DAYS) {
        factors.push(FACTOR_QUICK_CLOSE.to_owned());
    }
    if deal
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(REFERENCE_KEYWORD))
    {
        factors.push(FACTOR_REFERENCE.to_owned());
    }

    factors
}

/// Labels explaining what went wrong, in fixed order: low probability,
/// lost, extended cycle, recorded loss reason.
pub fn risk_factors(deal: &HistoricalDeal, days_to_close: Option<i64>) -> Vec<String> {
    let mut factors = Vec::new();

    if deal.probability.is_some_and(|p| p <= LOW_PROBABILITY) {
        factors.push(FACTOR_LOW_PROBABILITY.to_owned());
    }
    if deal.stage == Stage::ClosedLost {
        factors.push(FACTOR_CLOSED_LOST.to_owned());
    }
    if days_to_close.is_some_and(|d| d > EXTENDED_CYCLE_DAYS) {
        factors.push(FACTOR_EXTENDED_CYCLE.to_owned());
    }
    if let Some(reason) = deal.loss_reason.as_deref() {
        if !reason.is_empty() {
            factors.push(format!("{FACTOR_LOSS_REASON_PREFIX}{reason}"));
        }
    }

    factors
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Score `history` against `candidate` and return the closest matches.
///
/// Ineligible records are dropped, survivors are scored, and only deals
/// whose raw score exceeds [`MIN_SIMILARITY_SCORE`] are kept. The result is
/// sorted by descending score (stable, so equal scores keep their input
/// order) and capped at [`MAX_RESULTS`]. An empty `history` yields an empty
/// list; nothing here fails or mutates its inputs.
pub fn find_similar_deals(
    candidate: &CandidateDeal,
    history: &[HistoricalDeal],
) -> Vec<SimilarDeal> {
    let mut scored: Vec<(f64, &HistoricalDeal)> = history
        .iter()
        .filter(|deal| is_eligible(deal))
        .map(|deal| (score_deal(candidate, deal), deal))
        .filter(|(score, _)| *score > MIN_SIMILARITY_SCORE)
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(MAX_RESULTS);

    scored
        .into_iter()
        .map(|(score, deal)| to_similar_deal(score, deal))
        .collect()
}

fn to_similar_deal(raw_score: f64, deal: &HistoricalDeal) -> SimilarDeal {
    let days = days_to_close(deal.created_at, deal.actual_close_date);

    SimilarDeal {
        opportunity_id: deal.id,
        similarity_score: (raw_score * 100.0).round() as i32,
        title: deal.title.clone(),
        client_name: deal.client_name.clone(),
        estimated_value: deal.estimated_value,
        currency: deal.currency.clone(),
        stage: deal.stage,
        source: deal.source,
        expected_close_date: deal.expected_close_date,
        actual_close_date: deal.actual_close_date,
        days_to_close: days,
        description: deal.description.clone(),
        success_factors: success_factors(deal, days),
        risk_factors: risk_factors(deal, days),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
