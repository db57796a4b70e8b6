//! Domain records shared across the workspace
//!
//! - Items: lost/found reports with location, category and vision data
//! - Matches: scored lost/found pairings with per-side confirmation
//! - Notifications: per-owner match alerts
//! - Chat messages: per-match conversation rows (cleanup target)

pub mod chat;
pub mod item;
pub mod match_record;
pub mod notification;

pub use chat::ChatMessage;
pub use item::{BoundingBox, DetectedObject, Item, ItemKind, Location, VisionSummary};
pub use match_record::{Match, MatchSide, MatchState};
pub use notification::{Notification, NotificationKind};
