//! Image analysis capability
//!
//! Item photos are annotated at intake with scene labels and localized
//! objects; the scorer prompt later folds those annotations into its
//! comparison. Analysis is strictly best-effort: an item report must never
//! be rejected because an image could not be analyzed, so the trait has no
//! error channel and adapters degrade to an empty summary instead.

pub mod google;

pub use google::GoogleVisionClient;

use async_trait::async_trait;
use refound_common::models::VisionSummary;

/// Extracts labels and localized objects from an item photo.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze the image at `image_url`.
    ///
    /// Never fails: adapters log upstream trouble and return an empty
    /// summary.
    async fn analyze(&self, image_url: &str) -> VisionSummary;
}
