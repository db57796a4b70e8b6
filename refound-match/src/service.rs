//! Service facade
//!
//! The one surface the embedding backend calls. Item intake hands each
//! freshly stored report to [`MatchingService::process_new_item`]; the
//! confirm/delete/purge entry points back the match endpoints and the
//! item-deletion cleanup hook.

use refound_common::models::{Item, Match};
use refound_common::Result;
use tracing::info;
use uuid::Uuid;

use crate::lifecycle::{ConfirmOutcome, MatchLifecycle};
use crate::orchestrator::MatchingOrchestrator;

pub struct MatchingService {
    orchestrator: MatchingOrchestrator,
    lifecycle: MatchLifecycle,
}

impl MatchingService {
    pub fn new(orchestrator: MatchingOrchestrator, lifecycle: MatchLifecycle) -> Self {
        Self {
            orchestrator,
            lifecycle,
        }
    }

    /// Run the pipeline for a newly created report: evaluate stored
    /// counterparts, then propose matches for the strong ones. Returns
    /// the proposals made (possibly none).
    pub async fn process_new_item(&self, item: &Item) -> Result<Vec<Match>> {
        let candidates = self.orchestrator.find_potential_matches(item).await;
        let proposed = self.lifecycle.propose_matches(item, &candidates).await;

        info!(
            item_id = %item.id,
            candidates = candidates.len(),
            proposed = proposed.len(),
            "New report processed"
        );
        Ok(proposed)
    }

    /// See [`MatchLifecycle::confirm_match`].
    pub async fn confirm_match(&self, match_id: Uuid, user_id: Uuid) -> Result<ConfirmOutcome> {
        self.lifecycle.confirm_match(match_id, user_id).await
    }

    /// See [`MatchLifecycle::delete_match`].
    pub async fn delete_match(&self, match_id: Uuid) -> Result<Match> {
        self.lifecycle.delete_match(match_id).await
    }

    /// See [`MatchLifecycle::purge_item`].
    pub async fn purge_item(&self, item_id: Uuid) -> Result<u64> {
        self.lifecycle.purge_item(item_id).await
    }
}
