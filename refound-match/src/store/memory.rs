//! In-memory store implementations
//!
//! RwLock'd maps with the same observable behavior as the SQLite stores,
//! for tests and for embedding the pipeline without a database. Listing
//! order matches the SQLite stores: map iteration order is arbitrary, so
//! results are sorted by timestamp with the id as tie-break.

use async_trait::async_trait;
use refound_common::models::{ChatMessage, Item, ItemKind, Match, MatchSide, Notification};
use refound_common::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatStore, ItemStore, MatchStore, NotificationStore};

/// Item storage over a guarded map.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<HashMap<Uuid, Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(&self, item: &Item) -> Result<()> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find_unresolved_by_kind(&self, kind: ItemKind) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        let mut found: Vec<Item> = items
            .values()
            .filter(|item| item.kind == kind && !item.is_resolved)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn set_resolved(&self, id: Uuid, resolved: bool) -> Result<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&id) {
            Some(item) => {
                item.is_resolved = resolved;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Match storage over a guarded map.
#[derive(Default)]
pub struct MemoryMatchStore {
    matches: RwLock<HashMap<Uuid, Match>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches, for test assertions.
    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn create(&self, record: &Match) -> Result<()> {
        self.matches.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Match>> {
        Ok(self.matches.read().await.get(&id).cloned())
    }

    async fn find_by_item(&self, item_id: Uuid) -> Result<Vec<Match>> {
        let matches = self.matches.read().await;
        let mut found: Vec<Match> = matches
            .values()
            .filter(|m| m.involves_item(item_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Match>> {
        let matches = self.matches.read().await;
        let mut found: Vec<Match> = matches
            .values()
            .filter(|m| m.user1_id == user_id || m.user2_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn set_confirmed(&self, id: Uuid, side: MatchSide) -> Result<Option<Match>> {
        let mut matches = self.matches.write().await;
        match matches.get_mut(&id) {
            Some(record) => {
                match side {
                    MatchSide::User1 => record.user1_confirmed = true,
                    MatchSide::User2 => record.user2_confirmed = true,
                }
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.matches.write().await.remove(&id).is_some())
    }
}

/// Notification storage over a guarded map.
#[derive(Default)]
pub struct MemoryNotificationStore {
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notifications, for test assertions.
    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> Result<()> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        Ok(self.notifications.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut found: Vec<Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<Notification>> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(&id) {
            Some(notification) => {
                notification.is_read = read;
                Ok(Some(notification.clone()))
            }
            None => Ok(None),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let mut notifications = self.notifications.write().await;
        let mut flipped = 0;
        for notification in notifications.values_mut() {
            if notification.user_id == user_id && !notification.is_read {
                notification.is_read = true;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.notifications.write().await.remove(&id).is_some())
    }

    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|_, n| n.match_id != match_id);
        Ok((before - notifications.len()) as u64)
    }
}

/// Chat storage over a guarded map.
#[derive(Default)]
pub struct MemoryChatStore {
    messages: RwLock<HashMap<Uuid, ChatMessage>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a message, for tests exercising the cascade's chat cleanup.
    pub async fn insert(&self, message: ChatMessage) {
        self.messages.write().await.insert(message.id, message);
    }

    pub async fn count_by_match(&self, match_id: Uuid) -> u64 {
        self.messages
            .read()
            .await
            .values()
            .filter(|m| m.match_id == match_id)
            .count() as u64
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn delete_by_match(&self, match_id: Uuid) -> Result<u64> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|_, m| m.match_id != match_id);
        Ok((before - messages.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item(kind: ItemKind) -> Item {
        Item::new(
            Uuid::new_v4(),
            kind,
            "black wallet".into(),
            "http://localhost/items/w.jpg".into(),
        )
    }

    #[tokio::test]
    async fn candidate_query_filters_kind_and_resolution() {
        let store = MemoryItemStore::new();
        let lost = item(ItemKind::Lost);
        let found = item(ItemKind::Found);
        let mut resolved_found = item(ItemKind::Found);
        resolved_found.is_resolved = true;

        store.create(&lost).await.unwrap();
        store.create(&found).await.unwrap();
        store.create(&resolved_found).await.unwrap();

        let candidates = store.find_unresolved_by_kind(ItemKind::Found).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, found.id);
    }

    #[tokio::test]
    async fn candidate_query_returns_oldest_first() {
        let store = MemoryItemStore::new();
        let mut older = item(ItemKind::Found);
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = item(ItemKind::Found);

        store.create(&newer).await.unwrap();
        store.create(&older).await.unwrap();

        let candidates = store.find_unresolved_by_kind(ItemKind::Found).await.unwrap();
        assert_eq!(candidates[0].id, older.id);
        assert_eq!(candidates[1].id, newer.id);
    }

    #[tokio::test]
    async fn set_resolved_reports_presence() {
        let store = MemoryItemStore::new();
        let report = item(ItemKind::Lost);
        store.create(&report).await.unwrap();

        assert!(store.set_resolved(report.id, true).await.unwrap());
        assert!(store.find_by_id(report.id).await.unwrap().unwrap().is_resolved);
        assert!(!store.set_resolved(Uuid::new_v4(), true).await.unwrap());
    }

    #[tokio::test]
    async fn set_confirmed_touches_one_side() {
        let store = MemoryMatchStore::new();
        let record = Match::new(&item(ItemKind::Lost), &item(ItemKind::Found), 85);
        store.create(&record).await.unwrap();

        let after = store
            .set_confirmed(record.id, MatchSide::User2)
            .await
            .unwrap()
            .unwrap();
        assert!(!after.user1_confirmed);
        assert!(after.user2_confirmed);

        let after = store
            .set_confirmed(record.id, MatchSide::User1)
            .await
            .unwrap()
            .unwrap();
        assert!(after.is_fully_confirmed());

        assert!(store
            .set_confirmed(Uuid::new_v4(), MatchSide::User1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn match_lookups_cover_both_positions() {
        let store = MemoryMatchStore::new();
        let lost = item(ItemKind::Lost);
        let found = item(ItemKind::Found);
        let record = Match::new(&lost, &found, 75);
        store.create(&record).await.unwrap();

        assert_eq!(store.find_by_item(lost.id).await.unwrap().len(), 1);
        assert_eq!(store.find_by_item(found.id).await.unwrap().len(), 1);
        assert_eq!(store.find_by_user(lost.user_id).await.unwrap().len(), 1);
        assert_eq!(store.find_by_user(found.user_id).await.unwrap().len(), 1);
        assert!(store.find_by_user(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deletes_are_idempotent() {
        let store = MemoryMatchStore::new();
        let record = Match::new(&item(ItemKind::Lost), &item(ItemKind::Found), 90);
        store.create(&record).await.unwrap();

        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn mark_all_read_counts_only_flips() {
        let store = MemoryNotificationStore::new();
        let user = Uuid::new_v4();
        let match_id = Uuid::new_v4();

        let unread = Notification::match_found(user, match_id, ItemKind::Lost, &item(ItemKind::Found), 80);
        let mut read = Notification::match_found(user, match_id, ItemKind::Lost, &item(ItemKind::Found), 80);
        read.is_read = true;
        let other_user =
            Notification::match_found(Uuid::new_v4(), match_id, ItemKind::Found, &item(ItemKind::Lost), 80);

        store.create(&unread).await.unwrap();
        store.create(&read).await.unwrap();
        store.create(&other_user).await.unwrap();

        assert_eq!(store.mark_all_read(user).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(user).await.unwrap(), 0);
        assert!(!store
            .find_by_id(other_user.id)
            .await
            .unwrap()
            .unwrap()
            .is_read);
    }

    #[tokio::test]
    async fn delete_by_match_clears_only_that_conversation() {
        let store = MemoryChatStore::new();
        let match_id = Uuid::new_v4();
        let other_match = Uuid::new_v4();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .insert(ChatMessage::new(match_id, alice, bob, "is it mine?".into()))
            .await;
        store
            .insert(ChatMessage::new(match_id, bob, alice, "describe it".into()))
            .await;
        store
            .insert(ChatMessage::new(other_match, alice, bob, "hello".into()))
            .await;

        assert_eq!(store.delete_by_match(match_id).await.unwrap(), 2);
        assert_eq!(store.delete_by_match(match_id).await.unwrap(), 0);
        assert_eq!(store.count_by_match(other_match).await, 1);
    }
}
