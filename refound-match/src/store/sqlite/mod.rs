//! SQLite store implementations
//!
//! sqlx over the pool from `refound_common::db::init_database`. Uuids are
//! TEXT, timestamps are fixed-width RFC3339 TEXT (so ORDER BY on the raw
//! column is chronological), and structured fields (colors, location,
//! vision) are JSON TEXT.

mod chat;
mod items;
mod matches;
mod notifications;

pub use chat::SqliteChatStore;
pub use items::SqliteItemStore;
pub use matches::SqliteMatchStore;
pub use notifications::SqliteNotificationStore;

use chrono::{DateTime, SecondsFormat, Utc};
use refound_common::{Error, Result};
use uuid::Uuid;

/// Fixed-width UTC form for TEXT timestamp columns.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("invalid timestamp in {column}: {e}")))
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("invalid uuid in {column}: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T, column: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("failed to encode {column}: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(value: &str, column: &str) -> Result<T> {
    serde_json::from_str(value).map_err(|e| Error::Internal(format!("invalid JSON in {column}: {e}")))
}
