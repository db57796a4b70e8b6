//! # Refound Matching Subsystem
//!
//! Decides which lost/found item pairs are worth comparing, orchestrates
//! external confidence scoring, persists match records, and drives them
//! through the confirm/resolve/cleanup lifecycle.
//!
//! Pipeline for a new report:
//! prefilter → scorer → match records → notifications → live delivery.
//!
//! The embedding backend wires concrete stores and capability adapters
//! into [`MatchingService`]; everything behind a trait here (persistence,
//! scoring, vision) can be swapped without touching the pipeline.

pub mod emitter;
pub mod geo;
pub mod lifecycle;
pub mod orchestrator;
pub mod prefilter;
pub mod scorer;
pub mod service;
pub mod store;
pub mod vision;

pub use emitter::{DeliveryGuard, NotificationEmitter};
pub use lifecycle::{ConfirmOutcome, MatchLifecycle};
pub use orchestrator::{MatchingOrchestrator, ScoredCandidate};
pub use service::MatchingService;
