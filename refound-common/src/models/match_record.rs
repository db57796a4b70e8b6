//! Match records and the confirmation state machine
//!
//! A match pairs one lost item with one found item at a confidence score.
//! Position 1 is always the item whose arrival triggered the proposal;
//! position 2 is the pre-existing candidate. Each referenced owner can
//! confirm exactly once; when both have confirmed the match is resolved
//! and the record (with its notifications and chat thread) is removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Item;

/// Which of the two referenced users an operation acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSide {
    User1,
    User2,
}

impl MatchSide {
    pub fn other(self) -> MatchSide {
        match self {
            MatchSide::User1 => MatchSide::User2,
            MatchSide::User2 => MatchSide::User1,
        }
    }
}

/// Confirmation progress, derived from the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    Proposed,
    PartiallyConfirmed,
    FullyConfirmed,
}

/// A proposed pairing of two opposite-kind items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    /// The item that triggered the proposal.
    pub item1_id: Uuid,
    /// The candidate it was scored against.
    pub item2_id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    /// Confidence score, 0..=100.
    pub score: u8,
    #[serde(default)]
    pub user1_confirmed: bool,
    #[serde(default)]
    pub user2_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Pair a newly reported item with a scored candidate.
    pub fn new(new_item: &Item, candidate: &Item, score: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            item1_id: new_item.id,
            item2_id: candidate.id,
            user1_id: new_item.user_id,
            user2_id: candidate.user_id,
            score,
            user1_confirmed: false,
            user2_confirmed: false,
            created_at: Utc::now(),
        }
    }

    /// The side `user_id` occupies, or `None` for a third party.
    pub fn side_of(&self, user_id: Uuid) -> Option<MatchSide> {
        if user_id == self.user1_id {
            Some(MatchSide::User1)
        } else if user_id == self.user2_id {
            Some(MatchSide::User2)
        } else {
            None
        }
    }

    pub fn user_on(&self, side: MatchSide) -> Uuid {
        match side {
            MatchSide::User1 => self.user1_id,
            MatchSide::User2 => self.user2_id,
        }
    }

    pub fn is_confirmed_by(&self, side: MatchSide) -> bool {
        match side {
            MatchSide::User1 => self.user1_confirmed,
            MatchSide::User2 => self.user2_confirmed,
        }
    }

    pub fn is_fully_confirmed(&self) -> bool {
        self.user1_confirmed && self.user2_confirmed
    }

    pub fn state(&self) -> MatchState {
        match (self.user1_confirmed, self.user2_confirmed) {
            (true, true) => MatchState::FullyConfirmed,
            (false, false) => MatchState::Proposed,
            _ => MatchState::PartiallyConfirmed,
        }
    }

    /// Whether the match references `item_id` in either position.
    pub fn involves_item(&self, item_id: Uuid) -> bool {
        self.item1_id == item_id || self.item2_id == item_id
    }
}
