//! Match scoring capability
//!
//! A scorer compares one lost item against one found item and returns a
//! confidence score with reasoning. Adapters fail loudly through
//! [`ScorerError`]; deciding what a failed evaluation means for the batch
//! is the orchestrator's call, not the adapter's.

use async_trait::async_trait;
use refound_common::models::Item;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiScorer;

/// Outcome of one lost/found comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEvaluation {
    /// Confidence that both records describe the same object, 0..=100.
    pub confidence: u8,
    /// Scorer's explanation, kept for notifications and debugging.
    pub reasoning: String,
}

/// Scorer adapter errors.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("scorer rate limit exceeded")]
    RateLimited,

    #[error("scorer API error: HTTP {0}: {1}")]
    Api(u16, String),

    #[error("cannot parse scorer response: {0}")]
    Parse(String),
}

/// Capability interface for confidence scoring.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Evaluate how likely `found` is the object described by `lost`.
    async fn evaluate(&self, lost: &Item, found: &Item) -> Result<MatchEvaluation, ScorerError>;
}

/// Clamp a parsed score into the 0..=100 contract. Upstream models
/// occasionally emit out-of-range numbers.
pub fn clamp_confidence(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}
