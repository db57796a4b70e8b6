//! Live notification delivery
//!
//! Forwards already-persisted notifications onto the event bus, where the
//! transport layer (sockets, SSE) routes them by user. A process-wide
//! delivery guard suppresses a repeat forward of the same notification to
//! the same user inside a cooldown window, so retried proposals do not
//! double-push. Suppression affects only the live push; the notification
//! row was written before `emit` was called and stays untouched.

use refound_common::events::{EventBus, RefoundEvent};
use refound_common::models::Notification;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Default suppression window for repeat forwards.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Process-wide duplicate-forward suppression, keyed
/// `"{user_id}:{notification_id}"`.
pub struct DeliveryGuard {
    state: Mutex<GuardState>,
    cooldown: Duration,
}

struct GuardState {
    recent: HashMap<String, Instant>,
    last_sweep: Instant,
}

impl DeliveryGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(GuardState {
                recent: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            cooldown,
        }
    }

    /// Record a forward of `key` unless one already happened within the
    /// cooldown; returns false when the forward must be suppressed.
    ///
    /// Expired entries are swept here, at most once per window, keeping
    /// the map bounded by recent traffic.
    async fn try_record(&self, key: String) -> bool {
        let now = Instant::now();
        let cooldown = self.cooldown;
        let mut state = self.state.lock().await;

        if now.duration_since(state.last_sweep) >= cooldown {
            state
                .recent
                .retain(|_, sent| now.duration_since(*sent) < cooldown);
            state.last_sweep = now;
        }

        if let Some(sent) = state.recent.get(&key) {
            if now.duration_since(*sent) < cooldown {
                return false;
            }
        }

        state.recent.insert(key, now);
        true
    }

    /// Number of tracked entries, for test assertions.
    pub async fn tracked(&self) -> usize {
        self.state.lock().await.recent.len()
    }
}

impl Default for DeliveryGuard {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

/// Forwards persisted notifications as [`RefoundEvent::MatchNotification`]
/// events.
#[derive(Clone)]
pub struct NotificationEmitter {
    bus: EventBus,
    guard: Arc<DeliveryGuard>,
}

impl NotificationEmitter {
    pub fn new(bus: EventBus, guard: Arc<DeliveryGuard>) -> Self {
        Self { bus, guard }
    }

    /// Forward a persisted notification to the user's live channel.
    ///
    /// Returns false when the guard suppressed the forward as a duplicate.
    /// Delivery itself is lossy: zero live subscribers is normal.
    pub async fn emit(&self, user_id: Uuid, notification: &Notification) -> bool {
        let key = format!("{}:{}", user_id, notification.id);
        if !self.guard.try_record(key).await {
            debug!(
                user_id = %user_id,
                notification_id = %notification.id,
                "Duplicate forward suppressed"
            );
            return false;
        }

        self.bus.emit_lossy(RefoundEvent::MatchNotification {
            user_id,
            notification: notification.clone(),
            timestamp: chrono::Utc::now(),
        });

        debug!(
            user_id = %user_id,
            notification_id = %notification.id,
            "Notification forwarded for live delivery"
        );
        true
    }

    /// The bus events are emitted on, for wiring further emitters and
    /// subscribers.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
