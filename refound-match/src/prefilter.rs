//! Candidate prefilter
//!
//! Cheap rejection of lost/found pairs that cannot plausibly match, so the
//! expensive scorer only sees survivors. The filter is deliberately
//! permissive: a check only fires when both sides carry the data it needs.
//! Missing category, missing timestamps or non-coordinate locations never
//! disqualify a pair.

use refound_common::models::Item;

use crate::geo;

/// Why a pair was rejected before scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// One of the items is already resolved.
    AlreadyResolved,
    /// The found item predates the lost item's reported loss.
    FoundBeforeLost,
    /// Both categories present and not an exact match.
    CategoryMismatch,
    /// Both locations structured and further apart than the cutoff.
    TooFarApart { distance_km: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyResolved => write!(f, "already resolved"),
            SkipReason::FoundBeforeLost => write!(f, "found predates lost"),
            SkipReason::CategoryMismatch => write!(f, "category mismatch"),
            SkipReason::TooFarApart { distance_km } => {
                write!(f, "too far apart ({distance_km:.1} km)")
            }
        }
    }
}

/// Decide whether a (lost, found) pair should skip scoring, and why.
///
/// Checks run cheapest-first; the first one that fires wins. Categories
/// compare exactly and case-sensitively. The distance check fires only
/// strictly beyond `max_distance_km`, so a pair at exactly the cutoff is
/// still scored.
pub fn skip_reason(lost: &Item, found: &Item, max_distance_km: f64) -> Option<SkipReason> {
    if lost.is_resolved || found.is_resolved {
        return Some(SkipReason::AlreadyResolved);
    }

    if let (Some(lost_at), Some(found_at)) = (lost.observed_at, found.observed_at) {
        if found_at < lost_at {
            return Some(SkipReason::FoundBeforeLost);
        }
    }

    if let (Some(lost_cat), Some(found_cat)) = (&lost.category, &found.category) {
        if lost_cat != found_cat {
            return Some(SkipReason::CategoryMismatch);
        }
    }

    if let Some(distance_km) = geo::distance_km(&lost.location, &found.location) {
        if distance_km > max_distance_km {
            return Some(SkipReason::TooFarApart { distance_km });
        }
    }

    None
}

/// Boolean view of [`skip_reason`].
pub fn should_skip(lost: &Item, found: &Item, max_distance_km: f64) -> bool {
    skip_reason(lost, found, max_distance_km).is_some()
}
