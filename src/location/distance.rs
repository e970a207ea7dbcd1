//! Great-circle distance.

use super::types::Coordinate;
use std::cmp::Ordering;
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude * DEG, b.latitude * DEG);
    let dlat = (b.latitude - a.latitude) * DEG;
    let dlon = (b.longitude - a.longitude) * DEG;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards asin against h drifting just past 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Sort items by distance from `origin`, nearest first.
///
/// Items whose coordinate is unknown keep their relative order at the end.
pub fn nearest_first<T, F>(origin: Coordinate, items: &mut [T], coord_of: F)
where
    F: Fn(&T) -> Option<Coordinate>,
{
    items.sort_by(|x, y| {
        let dx = coord_of(x).map(|c| haversine_km(origin, c));
        let dy = coord_of(y).map(|c| haversine_km(origin, c));
        match (dx, dy) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
