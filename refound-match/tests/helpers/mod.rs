//! Test helper utilities
//!
//! Shared builders and wiring for refound-match integration tests.

use async_trait::async_trait;
use refound_common::events::EventBus;
use refound_common::models::{Item, ItemKind, Location};
use refound_common::MatchingConfig;
use refound_match::emitter::{DeliveryGuard, NotificationEmitter};
use refound_match::lifecycle::MatchLifecycle;
use refound_match::orchestrator::MatchingOrchestrator;
use refound_match::scorer::{MatchEvaluation, MatchScorer, ScorerError};
use refound_match::service::MatchingService;
use refound_match::store::{
    MemoryChatStore, MemoryItemStore, MemoryMatchStore, MemoryNotificationStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Initialize tracing once per test binary; repeat calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refound_match=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A report with enough detail for realistic pipeline runs.
pub fn item_of(kind: ItemKind, description: &str) -> Item {
    let mut item = Item::new(
        Uuid::new_v4(),
        kind,
        description.to_string(),
        format!("http://localhost/items/{}.jpg", Uuid::new_v4()),
    );
    item.category = Some("Electronics".to_string());
    item.location = Location::Structured {
        lat: 32.0853,
        lng: 34.7818,
    };
    item
}

pub fn lost_item(description: &str) -> Item {
    item_of(ItemKind::Lost, description)
}

pub fn found_item(description: &str) -> Item {
    item_of(ItemKind::Found, description)
}

/// What the scripted scorer should answer for a given item.
pub enum ScorerScript {
    Confidence(u8),
    Fail,
}

/// Scorer answering from a script keyed by item id (either side of the
/// pair), with a default confidence for unscripted pairs.
pub struct ScriptedScorer {
    scripts: HashMap<Uuid, ScorerScript>,
    default_confidence: u8,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn always(confidence: u8) -> Self {
        Self {
            scripts: HashMap::new(),
            default_confidence: confidence,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, item_id: Uuid, script: ScorerScript) -> Self {
        self.scripts.insert(item_id, script);
        self
    }

    /// Number of evaluate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchScorer for ScriptedScorer {
    async fn evaluate(&self, lost: &Item, found: &Item) -> Result<MatchEvaluation, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        for id in [lost.id, found.id] {
            match self.scripts.get(&id) {
                Some(ScorerScript::Confidence(confidence)) => {
                    return Ok(MatchEvaluation {
                        confidence: *confidence,
                        reasoning: format!("scripted confidence {confidence}"),
                    })
                }
                Some(ScorerScript::Fail) => {
                    return Err(ScorerError::Network("scripted failure".to_string()))
                }
                None => {}
            }
        }

        Ok(MatchEvaluation {
            confidence: self.default_confidence,
            reasoning: format!("default confidence {}", self.default_confidence),
        })
    }
}

/// Fully wired pipeline over in-memory stores, with handles kept open for
/// assertions against storage and the event bus.
pub struct TestHarness {
    pub items: Arc<MemoryItemStore>,
    pub matches: Arc<MemoryMatchStore>,
    pub notifications: Arc<MemoryNotificationStore>,
    pub chats: Arc<MemoryChatStore>,
    pub bus: EventBus,
    pub service: MatchingService,
}

pub fn harness(scorer: Arc<dyn MatchScorer>) -> TestHarness {
    harness_with_config(scorer, MatchingConfig::default())
}

pub fn harness_with_config(scorer: Arc<dyn MatchScorer>, config: MatchingConfig) -> TestHarness {
    init_test_logging();

    let items = Arc::new(MemoryItemStore::new());
    let matches = Arc::new(MemoryMatchStore::new());
    let notifications = Arc::new(MemoryNotificationStore::new());
    let chats = Arc::new(MemoryChatStore::new());

    let bus = EventBus::new(config.event_capacity);
    let guard = DeliveryGuard::new(std::time::Duration::from_millis(
        config.notification_cooldown_ms,
    ));
    let emitter = NotificationEmitter::new(bus.clone(), Arc::new(guard));

    let orchestrator = MatchingOrchestrator::new(items.clone(), scorer, config.clone());
    let lifecycle = MatchLifecycle::new(
        items.clone(),
        matches.clone(),
        notifications.clone(),
        chats.clone(),
        emitter,
        config,
    );

    TestHarness {
        items,
        matches,
        notifications,
        chats,
        bus,
        service: MatchingService::new(orchestrator, lifecycle),
    }
}
