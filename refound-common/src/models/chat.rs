//! Per-match chat messages
//!
//! The chat transport lives elsewhere; this record exists so match cleanup
//! can remove the conversation along with the match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(match_id: Uuid, sender_id: Uuid, receiver_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            sender_id,
            receiver_id,
            content,
            sent_at: Utc::now(),
        }
    }
}
