//! Notification rows

use async_trait::async_trait;
use refound_common::models::{Notification, NotificationKind};
use refound_common::Result;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::store::NotificationStore;

pub struct SqliteNotificationStore {
    pool: SqlitePool,
}

impl SqliteNotificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn create(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, match_id, kind, title, message, is_read, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(notification.match_id.to_string())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(format_timestamp(notification.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, match_id, kind, title, message, is_read, created_at
            FROM notifications
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_notification_row).transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, match_id, kind, title, message, is_read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_notification_row).collect()
    }

    async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            UPDATE notifications SET is_read = ? WHERE id = ?
            RETURNING id, user_id, match_id, kind, title, message, is_read, created_at
            "#,
        )
        .bind(read)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_notification_row).transpose()
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE match_id = ?")
            .bind(match_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn map_notification_row(row: &SqliteRow) -> Result<Notification> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let match_id: String = row.try_get("match_id")?;
    let kind: String = row.try_get("kind")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Notification {
        id: parse_uuid(&id, "notifications.id")?,
        user_id: parse_uuid(&user_id, "notifications.user_id")?,
        match_id: parse_uuid(&match_id, "notifications.match_id")?,
        kind: kind.parse::<NotificationKind>()?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        is_read: row.try_get("is_read")?,
        created_at: parse_timestamp(&created_at, "notifications.created_at")?,
    })
}
