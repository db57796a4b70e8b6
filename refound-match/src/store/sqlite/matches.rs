//! Match rows

use async_trait::async_trait;
use refound_common::models::{Match, MatchSide};
use refound_common::Result;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::store::MatchStore;

pub struct SqliteMatchStore {
    pool: SqlitePool,
}

impl SqliteMatchStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for SqliteMatchStore {
    async fn create(&self, record: &Match) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (
                id, item1_id, item2_id, user1_id, user2_id, score,
                user1_confirmed, user2_confirmed, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.item1_id.to_string())
        .bind(record.item2_id.to_string())
        .bind(record.user1_id.to_string())
        .bind(record.user2_id.to_string())
        .bind(i64::from(record.score))
        .bind(record.user1_confirmed)
        .bind(record.user2_confirmed)
        .bind(format_timestamp(record.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Match>> {
        let row = sqlx::query(
            r#"
            SELECT id, item1_id, item2_id, user1_id, user2_id, score,
                   user1_confirmed, user2_confirmed, created_at
            FROM matches
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_match_row).transpose()
    }

    async fn find_by_item(&self, item_id: Uuid) -> Result<Vec<Match>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item1_id, item2_id, user1_id, user2_id, score,
                   user1_confirmed, user2_confirmed, created_at
            FROM matches
            WHERE item1_id = ? OR item2_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(item_id.to_string())
        .bind(item_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_match_row).collect()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Match>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item1_id, item2_id, user1_id, user2_id, score,
                   user1_confirmed, user2_confirmed, created_at
            FROM matches
            WHERE user1_id = ? OR user2_id = ?
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_match_row).collect()
    }

    async fn set_confirmed(&self, id: Uuid, side: MatchSide) -> Result<Option<Match>> {
        // Fixed identifier chosen here, never caller data
        let column = match side {
            MatchSide::User1 => "user1_confirmed",
            MatchSide::User2 => "user2_confirmed",
        };
        let sql = format!(
            "UPDATE matches SET {column} = 1 WHERE id = ? \
             RETURNING id, item1_id, item2_id, user1_id, user2_id, score, \
                       user1_confirmed, user2_confirmed, created_at"
        );

        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_match_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_match_row(row: &SqliteRow) -> Result<Match> {
    let id: String = row.try_get("id")?;
    let item1_id: String = row.try_get("item1_id")?;
    let item2_id: String = row.try_get("item2_id")?;
    let user1_id: String = row.try_get("user1_id")?;
    let user2_id: String = row.try_get("user2_id")?;
    let score: i64 = row.try_get("score")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Match {
        id: parse_uuid(&id, "matches.id")?,
        item1_id: parse_uuid(&item1_id, "matches.item1_id")?,
        item2_id: parse_uuid(&item2_id, "matches.item2_id")?,
        user1_id: parse_uuid(&user1_id, "matches.user1_id")?,
        user2_id: parse_uuid(&user2_id, "matches.user2_id")?,
        score: score as u8,
        user1_confirmed: row.try_get("user1_confirmed")?,
        user2_confirmed: row.try_get("user2_confirmed")?,
        created_at: parse_timestamp(&created_at, "matches.created_at")?,
    })
}
