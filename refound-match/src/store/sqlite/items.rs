//! Item rows

use async_trait::async_trait;
use refound_common::models::{Item, ItemKind};
use refound_common::Result;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, from_json, parse_timestamp, parse_uuid, to_json};
use crate::store::ItemStore;

pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn create(&self, item: &Item) -> Result<()> {
        let vision = item
            .vision
            .as_ref()
            .map(|v| to_json(v, "items.vision"))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, user_id, kind, description, category, colors, brand,
                condition, flaws, material, image_url, location,
                observed_at, created_at, is_resolved, vision
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.user_id.to_string())
        .bind(item.kind.as_str())
        .bind(&item.description)
        .bind(&item.category)
        .bind(to_json(&item.colors, "items.colors")?)
        .bind(&item.brand)
        .bind(&item.condition)
        .bind(&item.flaws)
        .bind(&item.material)
        .bind(&item.image_url)
        .bind(to_json(&item.location, "items.location")?)
        .bind(item.observed_at.map(format_timestamp))
        .bind(format_timestamp(item.created_at))
        .bind(item.is_resolved)
        .bind(vision)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, kind, description, category, colors, brand,
                   condition, flaws, material, image_url, location,
                   observed_at, created_at, is_resolved, vision
            FROM items
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_item_row).transpose()
    }

    async fn find_unresolved_by_kind(&self, kind: ItemKind) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, description, category, colors, brand,
                   condition, flaws, material, image_url, location,
                   observed_at, created_at, is_resolved, vision
            FROM items
            WHERE kind = ? AND is_resolved = 0
            ORDER BY created_at, id
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_item_row).collect()
    }

    async fn set_resolved(&self, id: Uuid, resolved: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE items SET is_resolved = ? WHERE id = ?")
            .bind(resolved)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_item_row(row: &SqliteRow) -> Result<Item> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let kind: String = row.try_get("kind")?;
    let colors: String = row.try_get("colors")?;
    let location: String = row.try_get("location")?;
    let observed_at: Option<String> = row.try_get("observed_at")?;
    let created_at: String = row.try_get("created_at")?;
    let vision: Option<String> = row.try_get("vision")?;

    Ok(Item {
        id: parse_uuid(&id, "items.id")?,
        user_id: parse_uuid(&user_id, "items.user_id")?,
        kind: kind.parse::<ItemKind>()?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        colors: from_json(&colors, "items.colors")?,
        brand: row.try_get("brand")?,
        condition: row.try_get("condition")?,
        flaws: row.try_get("flaws")?,
        material: row.try_get("material")?,
        image_url: row.try_get("image_url")?,
        location: from_json(&location, "items.location")?,
        observed_at: observed_at
            .as_deref()
            .map(|s| parse_timestamp(s, "items.observed_at"))
            .transpose()?,
        created_at: parse_timestamp(&created_at, "items.created_at")?,
        is_resolved: row.try_get("is_resolved")?,
        vision: vision
            .as_deref()
            .map(|s| from_json(s, "items.vision"))
            .transpose()?,
    })
}
