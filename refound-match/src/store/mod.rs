//! Persistence boundary
//!
//! The pipeline talks to storage through these traits only, so production
//! can run on SQLite while tests run on the in-memory stores without
//! touching a database. Every delete is delete-if-exists: the lifecycle
//! cascade re-runs steps freely and a step that finds nothing left to do
//! succeeds.

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryChatStore, MemoryItemStore, MemoryMatchStore, MemoryNotificationStore};
pub use sqlite::{SqliteChatStore, SqliteItemStore, SqliteMatchStore, SqliteNotificationStore};

use async_trait::async_trait;
use refound_common::models::{Item, ItemKind, Match, MatchSide, Notification};
use refound_common::Result;
use uuid::Uuid;

/// Storage for lost/found item reports.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn create(&self, item: &Item) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>>;

    /// Unresolved reports on one side of the marketplace, oldest first.
    ///
    /// This is the orchestrator's candidate query.
    async fn find_unresolved_by_kind(&self, kind: ItemKind) -> Result<Vec<Item>>;

    /// Flip an item's resolved flag. Returns false when no such item exists.
    async fn set_resolved(&self, id: Uuid, resolved: bool) -> Result<bool>;
}

/// Storage for proposed matches.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create(&self, record: &Match) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Match>>;

    /// Matches referencing the item in either position, oldest first.
    async fn find_by_item(&self, item_id: Uuid) -> Result<Vec<Match>>;

    /// Matches where the user owns either side, newest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Match>>;

    /// Set one side's confirmation flag and return the row as written,
    /// or `None` when the match no longer exists. The update touches only
    /// the named side's flag, never the whole record.
    async fn set_confirmed(&self, id: Uuid, side: MatchSide) -> Result<Option<Match>>;

    /// Returns false when the match was already gone.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Storage for user notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>>;

    /// A user's notifications, newest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    /// Set the read flag and return the row as written, or `None` when the
    /// notification no longer exists.
    async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<Notification>>;

    /// Mark every unread notification of the user as read; returns how
    /// many were flipped.
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;

    /// Returns false when the notification was already gone.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Delete all notifications tied to a match; returns how many went.
    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64>;
}

/// Storage for match conversations.
///
/// The cascade only ever deletes whole conversations, so the trait stays
/// this narrow; concrete stores carry insert/count helpers for tests.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Delete a match's conversation; returns how many messages went.
    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64>;
}
