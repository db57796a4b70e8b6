//! Lost/found item records
//!
//! An item is one user report: "I lost this" or "I found this". The matching
//! pipeline compares unresolved items of opposite kind, so the record carries
//! everything the prefilter and scorer consume: category, colors, free-text
//! description, location, the reported loss/find time, and the vision
//! summary attached at intake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Which side of the marketplace the report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    /// The kind a candidate item must have to be comparable with this one.
    pub fn opposite(self) -> ItemKind {
        match self {
            ItemKind::Lost => ItemKind::Found,
            ItemKind::Found => ItemKind::Lost,
        }
    }

    /// Stable lowercase tag, used as the database TEXT value.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemKind::Lost),
            "found" => Ok(ItemKind::Found),
            other => Err(Error::InvalidInput(format!(
                "item kind must be 'lost' or 'found', got '{other}'"
            ))),
        }
    }
}

/// Where the item was lost or found.
///
/// Reports arrive with coordinates, with a free-text place name, or with
/// nothing at all. Only `Structured` locations participate in distance
/// filtering; the other two variants mean "distance unknown" and never
/// disqualify a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Location {
    Structured { lat: f64, lng: f64 },
    Freeform(String),
    Unset,
}

impl Default for Location {
    fn default() -> Self {
        Location::Unset
    }
}

impl Location {
    /// Coordinates when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Location::Structured { lat, lng } => Some((*lat, *lng)),
            Location::Freeform(_) | Location::Unset => None,
        }
    }
}

/// Image analysis results attached to an item at intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionSummary {
    /// Scene-level labels ("Bag", "Leather", "Fashion accessory").
    #[serde(default)]
    pub labels: Vec<String>,
    /// Localized objects with detection confidence.
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
}

impl VisionSummary {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.objects.is_empty()
    }
}

/// One object localized in the item image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    /// Detection confidence in [0.0, 1.0].
    pub score: f32,
    pub bounding_box: Option<BoundingBox>,
}

/// Normalized bounding box (coordinates in [0.0, 1.0] of image dimensions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A lost or found item report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Owner of the report.
    pub user_id: Uuid,
    pub kind: ItemKind,
    pub description: String,
    /// Free-text category ("Electronics", "Bags"). Compared exactly,
    /// case-sensitively, when both sides have one.
    pub category: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub flaws: Option<String>,
    pub material: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub location: Location,
    /// When the owner reports the item was lost/found. Drives the
    /// temporal-order prefilter check; comparable only when both sides
    /// have it.
    pub observed_at: Option<DateTime<Utc>>,
    /// Record insertion time (audit and candidate ordering, never
    /// matching semantics).
    pub created_at: DateTime<Utc>,
    /// Set once the item's match is fully confirmed; resolved items are
    /// excluded from matching.
    #[serde(default)]
    pub is_resolved: bool,
    pub vision: Option<VisionSummary>,
}

impl Item {
    /// Create a new unresolved report with generated id and timestamps.
    pub fn new(user_id: Uuid, kind: ItemKind, description: String, image_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            description,
            category: None,
            colors: Vec::new(),
            brand: None,
            condition: None,
            flaws: None,
            material: None,
            image_url,
            location: Location::Unset,
            observed_at: None,
            created_at: Utc::now(),
            is_resolved: false,
            vision: None,
        }
    }
}
