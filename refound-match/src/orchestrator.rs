//! Matching orchestrator
//!
//! Runs the pipeline for one new report: query unresolved candidates of
//! the opposite kind, prefilter, score the survivors, rank by confidence.
//! The orchestrator only evaluates; proposing matches from the ranking is
//! the lifecycle manager's job.
//!
//! Evaluation is deliberately failure-absorbing. Item intake must not
//! bounce because matching had trouble, so a candidate-query error yields
//! an empty ranking and one candidate's scorer failure drops only that
//! candidate.

use refound_common::models::{Item, ItemKind};
use refound_common::MatchingConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prefilter;
use crate::scorer::MatchScorer;
use crate::store::ItemStore;

/// One candidate that survived the prefilter and was scored.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item: Item,
    /// Scorer confidence, already clamped to 0..=100.
    pub score: u8,
    pub reasoning: String,
}

pub struct MatchingOrchestrator {
    items: Arc<dyn ItemStore>,
    scorer: Arc<dyn MatchScorer>,
    config: MatchingConfig,
}

impl MatchingOrchestrator {
    pub fn new(
        items: Arc<dyn ItemStore>,
        scorer: Arc<dyn MatchScorer>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            items,
            scorer,
            config,
        }
    }

    /// Evaluate every stored counterpart of `new_item` and rank the
    /// plausible ones, best first. Ties keep candidate order.
    pub async fn find_potential_matches(&self, new_item: &Item) -> Vec<ScoredCandidate> {
        let candidates = match self
            .items
            .find_unresolved_by_kind(new_item.kind.opposite())
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    item_id = %new_item.id,
                    error = %e,
                    "Candidate query failed, skipping matching for this report"
                );
                return Vec::new();
            }
        };

        debug!(
            item_id = %new_item.id,
            candidates = candidates.len(),
            "Evaluating candidates"
        );

        let mut scored = Vec::new();
        for candidate in candidates {
            // Prefilter and scorer reason in lost/found terms, whichever
            // side the new report is on
            let (lost, found) = match new_item.kind {
                ItemKind::Lost => (new_item, &candidate),
                ItemKind::Found => (&candidate, new_item),
            };

            if let Some(reason) = prefilter::skip_reason(lost, found, self.config.max_distance_km)
            {
                debug!(
                    item_id = %new_item.id,
                    candidate_id = %candidate.id,
                    %reason,
                    "Candidate skipped"
                );
                continue;
            }

            match self.scorer.evaluate(lost, found).await {
                Ok(evaluation) => {
                    scored.push(ScoredCandidate {
                        score: evaluation.confidence,
                        reasoning: evaluation.reasoning,
                        item: candidate,
                    });
                }
                Err(e) => {
                    warn!(
                        item_id = %new_item.id,
                        candidate_id = %candidate.id,
                        error = %e,
                        "Scoring failed, dropping candidate"
                    );
                }
            }
        }

        // sort_by is stable, so equal scores keep candidate order
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        info!(
            item_id = %new_item.id,
            scored = scored.len(),
            "Candidate evaluation complete"
        );

        scored
    }
}
