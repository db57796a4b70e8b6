//! Match lifecycle manager
//!
//! Owns every state transition of a match record: proposal out of a
//! ranking, one-sided and dual confirmation, the resolution cascade, and
//! explicit deletion. A match is `Proposed` at creation, becomes
//! `PartiallyConfirmed` when one owner confirms, and on the second
//! confirmation is resolved: both items are marked resolved, the record
//! and its notifications and chat are removed, and every other match
//! still referencing either item is swept.
//!
//! The cascade is non-transactional. Each step is idempotent
//! (update-if-present, delete-if-exists), so a partial run leaves only
//! leftovers that a later run or the sibling sweep removes.

use chrono::Utc;
use refound_common::events::RefoundEvent;
use refound_common::models::{Item, Match, MatchSide, Notification};
use refound_common::{Error, MatchingConfig, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::emitter::NotificationEmitter;
use crate::orchestrator::ScoredCandidate;
use crate::store::{ChatStore, ItemStore, MatchStore, NotificationStore};

/// What a successful confirmation did.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// One side confirmed; the other is still awaited.
    PartiallyConfirmed {
        record: Match,
        confirmed: MatchSide,
        awaiting: MatchSide,
    },
    /// Both sides have confirmed. The cascade ran and the record is gone
    /// from storage; the carried snapshot is the row as last written.
    FullyConfirmed { record: Match },
}

pub struct MatchLifecycle {
    items: Arc<dyn ItemStore>,
    matches: Arc<dyn MatchStore>,
    notifications: Arc<dyn NotificationStore>,
    chats: Arc<dyn ChatStore>,
    emitter: NotificationEmitter,
    config: MatchingConfig,
}

impl MatchLifecycle {
    pub fn new(
        items: Arc<dyn ItemStore>,
        matches: Arc<dyn MatchStore>,
        notifications: Arc<dyn NotificationStore>,
        chats: Arc<dyn ChatStore>,
        emitter: NotificationEmitter,
        config: MatchingConfig,
    ) -> Self {
        Self {
            items,
            matches,
            notifications,
            chats,
            emitter,
            config,
        }
    }

    /// Turn the ranking into stored proposals.
    ///
    /// Only candidates scoring strictly above the threshold become
    /// matches; a candidate at exactly the threshold does not. Each
    /// proposal persists the match, then one notification per owner,
    /// forwarding each through the emitter once its row is written. A
    /// failed create logs and abandons that candidate (no rollback of
    /// earlier steps; cascades clean up stragglers); remaining candidates
    /// continue.
    pub async fn propose_matches(
        &self,
        new_item: &Item,
        candidates: &[ScoredCandidate],
    ) -> Vec<Match> {
        let mut proposed = Vec::new();

        for candidate in candidates {
            if candidate.score <= self.config.score_threshold {
                debug!(
                    item_id = %new_item.id,
                    candidate_id = %candidate.item.id,
                    score = candidate.score,
                    threshold = self.config.score_threshold,
                    "Score at or below threshold, no proposal"
                );
                continue;
            }

            let record = Match::new(new_item, &candidate.item, candidate.score);
            if let Err(e) = self.matches.create(&record).await {
                warn!(
                    item_id = %new_item.id,
                    candidate_id = %candidate.item.id,
                    error = %e,
                    "Failed to create match, abandoning this proposal"
                );
                continue;
            }

            info!(
                match_id = %record.id,
                item1_id = %record.item1_id,
                item2_id = %record.item2_id,
                score = record.score,
                "Match proposed"
            );

            let owner1 = Notification::match_found(
                new_item.user_id,
                record.id,
                new_item.kind,
                &candidate.item,
                candidate.score,
            );
            let owner2 = Notification::match_found(
                candidate.item.user_id,
                record.id,
                candidate.item.kind,
                new_item,
                candidate.score,
            );

            for notification in [owner1, owner2] {
                match self.notifications.create(&notification).await {
                    Ok(()) => {
                        self.emitter.emit(notification.user_id, &notification).await;
                    }
                    Err(e) => {
                        warn!(
                            match_id = %record.id,
                            user_id = %notification.user_id,
                            error = %e,
                            "Failed to create notification, abandoning this proposal"
                        );
                        break;
                    }
                }
            }

            // The match row exists even when a notification step failed
            proposed.push(record);
        }

        proposed
    }

    /// Record one owner's confirmation.
    ///
    /// Rejections: `NotFound` when the match does not exist, `Forbidden`
    /// when the user owns neither side, `Conflict` when that side already
    /// confirmed. The post-update row returned by the store decides
    /// whether the match is now complete; a pre-write snapshot never does.
    pub async fn confirm_match(&self, match_id: Uuid, user_id: Uuid) -> Result<ConfirmOutcome> {
        let record = self
            .matches
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("match {match_id}")))?;

        let side = record.side_of(user_id).ok_or_else(|| {
            Error::Forbidden(format!("user {user_id} is not a party to match {match_id}"))
        })?;

        if record.is_confirmed_by(side) {
            return Err(Error::Conflict(format!(
                "user {user_id} already confirmed match {match_id}"
            )));
        }

        let updated = self
            .matches
            .set_confirmed(match_id, side)
            .await?
            .ok_or_else(|| Error::NotFound(format!("match {match_id}")))?;

        let fully_confirmed = updated.is_fully_confirmed();
        self.emitter.bus().emit_lossy(RefoundEvent::MatchConfirmed {
            match_id,
            user_id,
            fully_confirmed,
            timestamp: Utc::now(),
        });

        if fully_confirmed {
            info!(match_id = %match_id, user_id = %user_id, "Match fully confirmed, resolving");
            self.resolve(&updated).await;
            Ok(ConfirmOutcome::FullyConfirmed { record: updated })
        } else {
            info!(
                match_id = %match_id,
                user_id = %user_id,
                awaiting = ?side.other(),
                "Match partially confirmed"
            );
            Ok(ConfirmOutcome::PartiallyConfirmed {
                record: updated,
                confirmed: side,
                awaiting: side.other(),
            })
        }
    }

    /// Explicitly remove a proposal and its notifications.
    ///
    /// User-initiated, so unlike the cascade, persistence errors propagate.
    /// Returns the record as it stood before deletion.
    pub async fn delete_match(&self, match_id: Uuid) -> Result<Match> {
        let record = self
            .matches
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("match {match_id}")))?;

        self.notifications.delete_by_match(match_id).await?;
        self.matches.delete(match_id).await?;

        info!(match_id = %match_id, "Match deleted");
        Ok(record)
    }

    /// Remove every match referencing an item, along with each match's
    /// notifications and chat thread. Called when an owner deletes the
    /// underlying report. Returns how many matches were removed; re-running
    /// on an already-purged item removes zero.
    pub async fn purge_item(&self, item_id: Uuid) -> Result<u64> {
        let records = self.matches.find_by_item(item_id).await?;
        let mut removed = 0;

        for record in records {
            self.notifications.delete_by_match(record.id).await?;
            self.chats.delete_by_match(record.id).await?;
            if self.matches.delete(record.id).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(item_id = %item_id, matches = removed, "Item matches purged");
        }
        Ok(removed)
    }

    /// Resolution cascade after dual confirmation.
    ///
    /// Best-effort: a failed step is logged and the cascade moves on,
    /// because every step can be re-run and the sweep picks up stragglers.
    async fn resolve(&self, record: &Match) {
        for item_id in [record.item1_id, record.item2_id] {
            if let Err(e) = self.items.set_resolved(item_id, true).await {
                warn!(item_id = %item_id, error = %e, "Failed to mark item resolved");
            }
        }

        if let Err(e) = self.notifications.delete_by_match(record.id).await {
            warn!(match_id = %record.id, error = %e, "Failed to delete match notifications");
        }

        if let Err(e) = self.chats.delete_by_match(record.id).await {
            warn!(match_id = %record.id, error = %e, "Failed to delete match chat");
        }

        if let Err(e) = self.matches.delete(record.id).await {
            warn!(match_id = %record.id, error = %e, "Failed to delete match record");
        }

        for item_id in [record.item1_id, record.item2_id] {
            self.sweep_item_matches(item_id, record.id).await;
        }

        self.emitter.bus().emit_lossy(RefoundEvent::MatchResolved {
            match_id: record.id,
            item1_id: record.item1_id,
            item2_id: record.item2_id,
            timestamp: Utc::now(),
        });

        info!(
            match_id = %record.id,
            item1_id = %record.item1_id,
            item2_id = %record.item2_id,
            "Match resolved and cleaned up"
        );
    }

    /// Delete every other match still referencing a now-resolved item,
    /// with its notifications. Those proposals can no longer complete.
    async fn sweep_item_matches(&self, item_id: Uuid, resolved_match_id: Uuid) {
        let siblings = match self.matches.find_by_item(item_id).await {
            Ok(siblings) => siblings,
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "Sibling sweep query failed");
                return;
            }
        };

        for sibling in siblings {
            if sibling.id == resolved_match_id {
                continue;
            }
            if let Err(e) = self.notifications.delete_by_match(sibling.id).await {
                warn!(
                    match_id = %sibling.id,
                    error = %e,
                    "Failed to delete swept match notifications"
                );
            }
            match self.matches.delete(sibling.id).await {
                Ok(true) => {
                    info!(match_id = %sibling.id, item_id = %item_id, "Obsolete match swept")
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(match_id = %sibling.id, error = %e, "Failed to delete swept match")
                }
            }
        }
    }
}
