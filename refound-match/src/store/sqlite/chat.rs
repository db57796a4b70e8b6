//! Chat message rows
//!
//! The pipeline only deletes conversations; insert and count exist as
//! inherent methods so tests can stage messages for the cascade to sweep.

use async_trait::async_trait;
use refound_common::models::ChatMessage;
use refound_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::format_timestamp;
use crate::store::ChatStore;

pub struct SqliteChatStore {
    pool: SqlitePool,
}

impl SqliteChatStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, message: &ChatMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, match_id, sender_id, receiver_id, content, sent_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.match_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(message.receiver_id.to_string())
        .bind(&message.content)
        .bind(format_timestamp(message.sent_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count_by_match(&self, match_id: Uuid) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE match_id = ?")
            .bind(match_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE match_id = ?")
            .bind(match_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
