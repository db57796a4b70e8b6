//! Match notifications
//!
//! One row per owner per proposed match. Rows are persisted first and only
//! then forwarded for live delivery, so a subscriber crash never loses the
//! notification, only its push.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{Item, ItemKind};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "MATCH_FOUND")]
    MatchFound,
}

impl NotificationKind {
    /// Stable wire tag, used as the database TEXT value.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::MatchFound => "MATCH_FOUND",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCH_FOUND" => Ok(NotificationKind::MatchFound),
            other => Err(Error::InvalidInput(format!(
                "unknown notification kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    pub match_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the per-owner alert for a freshly proposed match. `own_kind`
    /// is the recipient's side; `counterpart` is the other party's item.
    pub fn match_found(
        user_id: Uuid,
        match_id: Uuid,
        own_kind: ItemKind,
        counterpart: &Item,
        score: u8,
    ) -> Self {
        let message = if counterpart.description.is_empty() {
            format!(
                "We found a potential match for your {} item! ({}% confidence)",
                own_kind.as_str(),
                score
            )
        } else {
            format!(
                "We found a potential match for your {} item: \"{}\" ({}% confidence)",
                own_kind.as_str(),
                counterpart.description,
                score
            )
        };
        Self {
            id: Uuid::new_v4(),
            user_id,
            match_id,
            kind: NotificationKind::MatchFound,
            title: "Potential Match Found!".to_string(),
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
