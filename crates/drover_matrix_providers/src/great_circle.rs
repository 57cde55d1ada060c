use geo::{Distance, Haversine};
use jiff::SignedDuration;

use crate::travel_matrix::TravelMatrix;

/// Average driving speed assumed when estimating durations from distance.
pub const FALLBACK_SPEED_KMH: f64 = 60.0;

/// Great-circle distance matrix.
///
/// Ignores the road network, so it underestimates real driving distance, but
/// it is pure arithmetic and always available. Serves as the terminal
/// fallback when the matrix API cannot be reached.
pub fn great_circle_matrix<P>(points: &[P], speed_kmh: f64) -> TravelMatrix
where
    for<'a> &'a P: Into<geo_types::Point>,
{
    let coords: Vec<geo_types::Point> = points.iter().map(|point| point.into()).collect();

    let mut matrix = TravelMatrix::zeroed(coords.len());
    for (from, origin) in coords.iter().enumerate() {
        for (to, destination) in coords.iter().enumerate() {
            if from == to {
                continue;
            }
            let km = Haversine.distance(*origin, *destination) / 1_000.0;
            matrix.set(from, to, km, duration_at_kmh(km, speed_kmh));
        }
    }

    matrix
}

fn duration_at_kmh(km: f64, speed_kmh: f64) -> SignedDuration {
    let hours = km / speed_kmh;
    SignedDuration::from_secs((hours * 3_600.0).round() as i64)
}
