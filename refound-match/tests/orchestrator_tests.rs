//! Orchestrator pipeline tests
//!
//! Candidate querying, prefilter wiring, scorer failure containment and
//! ranking order, exercised over in-memory stores with a scripted scorer.

mod helpers;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use helpers::{found_item, init_test_logging, lost_item, ScorerScript, ScriptedScorer};
use refound_common::models::{Item, ItemKind, Location};
use refound_common::{Error, MatchingConfig, Result};
use refound_match::orchestrator::MatchingOrchestrator;
use refound_match::scorer::MatchScorer;
use refound_match::store::{ItemStore, MemoryItemStore};
use std::sync::Arc;
use uuid::Uuid;

fn orchestrator_over(
    items: Arc<dyn ItemStore>,
    scorer: Arc<dyn MatchScorer>,
) -> MatchingOrchestrator {
    init_test_logging();
    MatchingOrchestrator::new(items, scorer, MatchingConfig::default())
}

/// Store whose every operation fails, for error-path tests.
struct FailingItemStore;

#[async_trait]
impl ItemStore for FailingItemStore {
    async fn create(&self, _item: &Item) -> Result<()> {
        Err(Error::Internal("store down".into()))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Item>> {
        Err(Error::Internal("store down".into()))
    }

    async fn find_unresolved_by_kind(&self, _kind: ItemKind) -> Result<Vec<Item>> {
        Err(Error::Internal("store down".into()))
    }

    async fn set_resolved(&self, _id: Uuid, _resolved: bool) -> Result<bool> {
        Err(Error::Internal("store down".into()))
    }
}

#[tokio::test]
async fn one_failing_candidate_does_not_abort_the_batch() {
    let items = Arc::new(MemoryItemStore::new());
    let good1 = found_item("silver Dell laptop");
    let bad = found_item("black Lenovo laptop");
    let good2 = found_item("grey HP laptop");
    for item in [&good1, &bad, &good2] {
        items.create(item).await.unwrap();
    }

    let scorer = Arc::new(ScriptedScorer::always(80).with(bad.id, ScorerScript::Fail));
    let orchestrator = orchestrator_over(items, scorer.clone());

    let ranked = orchestrator
        .find_potential_matches(&lost_item("silver laptop with stickers"))
        .await;

    // All three were attempted; only the failing one is missing
    assert_eq!(scorer.calls(), 3);
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|c| c.item.id != bad.id));
}

#[tokio::test]
async fn candidate_query_failure_yields_empty_ranking() {
    let scorer = Arc::new(ScriptedScorer::always(95));
    let orchestrator = orchestrator_over(Arc::new(FailingItemStore), scorer.clone());

    let ranked = orchestrator
        .find_potential_matches(&lost_item("blue umbrella"))
        .await;

    assert!(ranked.is_empty());
    assert_eq!(scorer.calls(), 0);
}

#[tokio::test]
async fn ranking_is_descending_and_stable() {
    let items = Arc::new(MemoryItemStore::new());
    let mut first = found_item("black wallet, worn corners");
    let mut second = found_item("black leather wallet");
    let mut third = found_item("dark brown wallet");
    // Fix candidate order through creation timestamps
    first.created_at = Utc::now() - Duration::minutes(30);
    second.created_at = Utc::now() - Duration::minutes(20);
    third.created_at = Utc::now() - Duration::minutes(10);
    for item in [&first, &second, &third] {
        items.create(item).await.unwrap();
    }

    let scorer = Arc::new(
        ScriptedScorer::always(0)
            .with(first.id, ScorerScript::Confidence(70))
            .with(second.id, ScorerScript::Confidence(90))
            .with(third.id, ScorerScript::Confidence(70)),
    );
    let orchestrator = orchestrator_over(items, scorer);

    let ranked = orchestrator
        .find_potential_matches(&lost_item("black wallet"))
        .await;

    let ids: Vec<Uuid> = ranked.iter().map(|c| c.item.id).collect();
    // 90 first; the tied 70s keep candidate order
    assert_eq!(ids, vec![second.id, first.id, third.id]);
    assert_eq!(ranked[0].score, 90);
}

#[tokio::test]
async fn prefiltered_candidates_are_never_scored() {
    let items = Arc::new(MemoryItemStore::new());

    let plausible = found_item("iPhone 13 with cracked screen");

    let mut resolved = found_item("iPhone 13, blue case");
    resolved.is_resolved = true;

    let mut wrong_category = found_item("leather satchel");
    wrong_category.category = Some("Bags".to_string());

    let mut too_far = found_item("iPhone 13 Pro");
    // Jerusalem, about 54 km from the lost report in Tel Aviv
    too_far.location = Location::Structured {
        lat: 31.7683,
        lng: 35.2137,
    };

    for item in [&plausible, &resolved, &wrong_category, &too_far] {
        items.create(item).await.unwrap();
    }

    let scorer = Arc::new(ScriptedScorer::always(88));
    let orchestrator = orchestrator_over(items, scorer.clone());

    let ranked = orchestrator
        .find_potential_matches(&lost_item("iPhone 13, cracked screen"))
        .await;

    assert_eq!(scorer.calls(), 1);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].item.id, plausible.id);
    assert_eq!(ranked[0].score, 88);
}

#[tokio::test]
async fn pairs_are_oriented_even_when_the_found_side_is_new() {
    let items = Arc::new(MemoryItemStore::new());

    // Lost report made after the find: temporally impossible pair
    let mut lost_later = lost_item("green scarf");
    lost_later.observed_at = Some(Utc::now());
    let mut lost_earlier = lost_item("green wool scarf");
    lost_earlier.observed_at = Some(Utc::now() - Duration::days(3));
    for item in [&lost_later, &lost_earlier] {
        items.create(item).await.unwrap();
    }

    let scorer = Arc::new(ScriptedScorer::always(75));
    let orchestrator = orchestrator_over(items, scorer.clone());

    let mut new_found = found_item("green scarf");
    new_found.observed_at = Some(Utc::now() - Duration::days(1));

    let ranked = orchestrator.find_potential_matches(&new_found).await;

    // Only the report lost before the find survives the prefilter
    assert_eq!(scorer.calls(), 1);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].item.id, lost_earlier.id);
}
