//! Opportunity pipeline vocabulary and field validation.
//!
//! Stages and acquisition sources are stored as snake_case TEXT in the
//! database and travel as the same strings over the API. The enums here are
//! the in-memory form used by the similarity engine; the `VALID_*` slices
//! and `validate_*` helpers guard the write path.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

pub const STAGE_LEAD: &str = "lead";
pub const STAGE_QUALIFIED: &str = "qualified";
pub const STAGE_PROPOSAL: &str = "proposal";
pub const STAGE_NEGOTIATION: &str = "negotiation";
pub const STAGE_CLOSED_WON: &str = "closed_won";
pub const STAGE_CLOSED_LOST: &str = "closed_lost";

/// Every stage an opportunity can occupy, in pipeline order.
pub const VALID_STAGES: &[&str] = &[
    STAGE_LEAD,
    STAGE_QUALIFIED,
    STAGE_PROPOSAL,
    STAGE_NEGOTIATION,
    STAGE_CLOSED_WON,
    STAGE_CLOSED_LOST,
];

/// Pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl Stage {
    /// The snake_case string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => STAGE_LEAD,
            Self::Qualified => STAGE_QUALIFIED,
            Self::Proposal => STAGE_PROPOSAL,
            Self::Negotiation => STAGE_NEGOTIATION,
            Self::ClosedWon => STAGE_CLOSED_WON,
            Self::ClosedLost => STAGE_CLOSED_LOST,
        }
    }

    /// Parse a stored stage string. Returns `None` for unknown values so
    /// callers decide whether to skip or reject the row.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            STAGE_LEAD => Some(Self::Lead),
            STAGE_QUALIFIED => Some(Self::Qualified),
            STAGE_PROPOSAL => Some(Self::Proposal),
            STAGE_NEGOTIATION => Some(Self::Negotiation),
            STAGE_CLOSED_WON => Some(Self::ClosedWon),
            STAGE_CLOSED_LOST => Some(Self::ClosedLost),
            _ => None,
        }
    }

    /// Whether the stage is a terminal (won or lost) state.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

// ---------------------------------------------------------------------------
// Acquisition sources
// ---------------------------------------------------------------------------

pub const SOURCE_INBOUND: &str = "inbound";
pub const SOURCE_OUTBOUND: &str = "outbound";
pub const SOURCE_REFERRAL: &str = "referral";
pub const SOURCE_PARTNER: &str = "partner";
pub const SOURCE_OTHER: &str = "other";

pub const VALID_SOURCES: &[&str] = &[
    SOURCE_INBOUND,
    SOURCE_OUTBOUND,
    SOURCE_REFERRAL,
    SOURCE_PARTNER,
    SOURCE_OTHER,
];

/// Channel through which an opportunity was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Inbound,
    Outbound,
    Referral,
    Partner,
    Other,
}

impl Source {
    /// The snake_case string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => SOURCE_INBOUND,
            Self::Outbound => SOURCE_OUTBOUND,
            Self::Referral => SOURCE_REFERRAL,
            Self::Partner => SOURCE_PARTNER,
            Self::Other => SOURCE_OTHER,
        }
    }

    /// Parse a stored source string. Unknown values yield `None` and are
    /// treated as "no source recorded" by the scoring path.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            SOURCE_INBOUND => Some(Self::Inbound),
            SOURCE_OUTBOUND => Some(Self::Outbound),
            SOURCE_REFERRAL => Some(Self::Referral),
            SOURCE_PARTNER => Some(Self::Partner),
            SOURCE_OTHER => Some(Self::Other),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field bounds
// ---------------------------------------------------------------------------

/// Probability is a whole percentage.
pub const MIN_PROBABILITY: i32 = 0;
pub const MAX_PROBABILITY: i32 = 100;

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate that `stage` is one of the allowed pipeline stages.
pub fn validate_stage(stage: &str) -> Result<(), CoreError> {
    if VALID_STAGES.contains(&stage) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid stage '{stage}'. Must be one of: {}",
            VALID_STAGES.join(", ")
        )))
    }
}

/// Validate that `source` is one of the allowed acquisition channels.
pub fn validate_source(source: &str) -> Result<(), CoreError> {
    if VALID_SOURCES.contains(&source) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid source '{source}'. Must be one of: {}",
            VALID_SOURCES.join(", ")
        )))
    }
}

/// Validate that `probability` is a whole percentage in `[0, 100]`.
pub fn validate_probability(probability: i32) -> Result<(), CoreError> {
    if !(MIN_PROBABILITY..=MAX_PROBABILITY).contains(&probability) {
        return Err(CoreError::Validation(format!(
            "Probability must be between {MIN_PROBABILITY} and {MAX_PROBABILITY}, got {probability}"
        )));
    }
    Ok(())
}

/// Validate that `value` is a finite, non-negative amount.
pub fn validate_estimated_value(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "Estimated value must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
