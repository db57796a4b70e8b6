//! Great-circle distance between item locations
//!
//! Matching treats distance as a three-valued fact: close enough, too far,
//! or unknown. Unknown (either side freeform or unset) never disqualifies
//! a pair, so the public entry point returns `Option<f64>` and leaves the
//! "unknown is permissive" decision to the caller.

use refound_common::models::Location;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinate pairs, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two item locations, `None` when either side has no
/// coordinates.
pub fn distance_km(a: &Location, b: &Location) -> Option<f64> {
    let (lat1, lng1) = a.coordinates()?;
    let (lat2, lng2) = b.coordinates()?;
    Some(haversine_km(lat1, lng1, lat2, lng2))
}
