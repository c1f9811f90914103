//! Caller-visible errors of the engine.
//!
//! Only malformed input is fatal. Out-of-range values are clamped, cycles are
//! flagged, and advisory failures fall back silently (see `advisory`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("weights must sum to 1.0, got {sum}")]
    BadSum { sum: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    #[error("task at position {index} has an empty id")]
    EmptyId { index: usize },

    #[error("task '{id}' has an empty title")]
    EmptyTitle { id: String },

    #[error("duplicate task id '{id}' in batch")]
    DuplicateId { id: String },

    #[error("invalid weights: {0}")]
    InvalidWeights(#[from] WeightError),
}
