use std::collections::BTreeMap;

use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use thiserror::Error;

use drover_core::{
    location::{LocationIndex, SlotIdx},
    route::{OptimizedRoute, Stop, StopKind},
};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("terminal response has neither a feasible nor an infeasible solution")]
    MissingSolution,

    #[error("vehicle {vehicle}: activity arrays disagree in length")]
    MismatchedArrays { vehicle: String },

    #[error("route references location slot {slot} outside the location index")]
    UnknownLocation { slot: usize },

    #[error("arrival stamp {stamp} is out of range")]
    ArrivalOutOfRange { stamp: f64 },
}

/// Terminal response of the hosted solver.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverResult {
    pub response: SolverResponseEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverResponseEnvelope {
    #[serde(default)]
    pub solver_response: Option<SolverSolution>,
    #[serde(default)]
    pub solver_infeasible_response: Option<SolverSolution>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverSolution {
    #[serde(default)]
    pub num_vehicles: i64,
    pub solution_cost: f64,
    #[serde(default)]
    pub vehicle_data: BTreeMap<String, VehicleRouteData>,
}

/// Parallel activity arrays for one vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRouteData {
    pub task_id: Vec<String>,
    #[serde(rename = "type")]
    pub task_type: Vec<ActivityType>,
    pub arrival_stamp: Vec<f64>,
    /// Location slot per activity row.
    pub route: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ActivityType {
    Depot,
    Pickup,
    Delivery,
    Break,
    #[serde(rename = "w")]
    Waypoint,
}

/// Converts a terminal solver response into the application route.
///
/// Only pickup and drop-off rows become stops; depot, break, and waypoint
/// rows are synthetic. Coordinates are recovered by indexing back into the
/// same [`LocationIndex`] the payload was built over.
///
/// The service reports its raw objective value, cost minus prize; the app
/// displays profit, so the sign is flipped exactly once, here.
pub fn translate(
    result: &SolverResult,
    index: &LocationIndex,
    vehicle_id: &str,
) -> Result<OptimizedRoute, TranslateError> {
    let (solution, feasible) = match (
        &result.response.solver_response,
        &result.response.solver_infeasible_response,
    ) {
        (Some(solution), _) => (solution, true),
        (None, Some(solution)) => (solution, false),
        (None, None) => return Err(TranslateError::MissingSolution),
    };

    let mut stops = Vec::new();
    let mut first_arrival: Option<f64> = None;
    let mut last_arrival: Option<f64> = None;

    for (vehicle, data) in &solution.vehicle_data {
        let rows = data.task_id.len();
        if data.task_type.len() != rows
            || data.arrival_stamp.len() != rows
            || data.route.len() != rows
        {
            return Err(TranslateError::MismatchedArrays {
                vehicle: vehicle.clone(),
            });
        }

        for row in 0..rows {
            let stamp = data.arrival_stamp[row];
            first_arrival = Some(first_arrival.map_or(stamp, |first| first.min(stamp)));
            last_arrival = Some(last_arrival.map_or(stamp, |last| last.max(stamp)));

            let kind = match data.task_type[row] {
                ActivityType::Pickup => StopKind::Pickup,
                ActivityType::Delivery => StopKind::Delivery,
                ActivityType::Depot | ActivityType::Break | ActivityType::Waypoint => continue,
            };

            let slot = SlotIdx::new(data.route[row]);
            let coordinates = index
                .coordinates(slot)
                .ok_or(TranslateError::UnknownLocation { slot: slot.get() })?;

            stops.push(Stop {
                task_id: data.task_id[row].clone(),
                kind,
                arrival: arrival_timestamp(stamp)?,
                coordinates,
            });
        }
    }

    let total_time = match (first_arrival, last_arrival) {
        (Some(first), Some(last)) => SignedDuration::from_secs((last - first).round() as i64),
        _ => SignedDuration::ZERO,
    };

    Ok(OptimizedRoute {
        vehicle_id: vehicle_id.to_owned(),
        stops,
        total_cost: -solution.solution_cost,
        total_time,
        feasible,
    })
}

fn arrival_timestamp(stamp: f64) -> Result<Timestamp, TranslateError> {
    Timestamp::from_second(stamp.round() as i64)
        .map_err(|_| TranslateError::ArrivalOutOfRange { stamp })
}

#[cfg(test)]
mod tests {
    use drover_core::coordinates::Coordinates;
    use serde_json::json;

    use super::*;

    fn index() -> LocationIndex {
        let mut index = LocationIndex::with_depot(Coordinates::new(0.0, 0.0));
        index.push_pair(Coordinates::new(0.0, 1.0), Coordinates::new(0.5, 1.0));
        index.push_pair(Coordinates::new(1.0, 0.0), Coordinates::new(1.0, 0.5));
        index
    }

    fn feasible_result() -> SolverResult {
        serde_json::from_value(json!({
            "response": {
                "solver_response": {
                    "num_vehicles": 1,
                    "solution_cost": 42.5,
                    "vehicle_data": {
                        "0": {
                            "task_id": ["Depot", "d-1-p", "d-1-d", "Break", "d-2-p", "d-2-d", "Depot"],
                            "type": ["Depot", "Pickup", "Delivery", "Break", "Pickup", "Delivery", "Depot"],
                            "arrival_stamp": [0.0, 600.0, 1500.0, 2100.0, 3600.0, 4500.0, 5400.0],
                            "route": [0, 1, 2, 2, 3, 4, 0]
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_one_stop_per_service_row_in_order() {
        let route = translate(&feasible_result(), &index(), "t-1").unwrap();

        let ids: Vec<_> = route.stops.iter().map(|stop| stop.task_id.as_str()).collect();
        assert_eq!(ids, vec!["d-1-p", "d-1-d", "d-2-p", "d-2-d"]);
        assert_eq!(route.stops[0].kind, StopKind::Pickup);
        assert_eq!(route.stops[1].kind, StopKind::Delivery);
    }

    #[test]
    fn test_coordinates_come_from_the_location_index() {
        let index = index();
        let route = translate(&feasible_result(), &index, "t-1").unwrap();

        assert_eq!(
            route.stops[0].coordinates,
            index.coordinates(SlotIdx::new(1)).unwrap()
        );
        assert_eq!(
            route.stops[3].coordinates,
            index.coordinates(SlotIdx::new(4)).unwrap()
        );
    }

    #[test]
    fn test_cost_sign_is_flipped_once() {
        let route = translate(&feasible_result(), &index(), "t-1").unwrap();

        assert_eq!(route.total_cost, -42.5);
    }

    #[test]
    fn test_total_time_spans_the_route() {
        let route = translate(&feasible_result(), &index(), "t-1").unwrap();

        assert_eq!(route.total_time, SignedDuration::from_secs(5_400));
    }

    #[test]
    fn test_infeasible_result_is_flagged() {
        let result: SolverResult = serde_json::from_value(json!({
            "response": {
                "solver_infeasible_response": {
                    "num_vehicles": 0,
                    "solution_cost": 0.0,
                    "vehicle_data": {}
                }
            }
        }))
        .unwrap();

        let route = translate(&result, &index(), "t-1").unwrap();

        assert!(!route.feasible);
        assert!(route.stops.is_empty());
    }

    #[test]
    fn test_unrecognized_shape_is_an_error() {
        let result: SolverResult =
            serde_json::from_value(json!({ "response": {} })).unwrap();

        assert!(matches!(
            translate(&result, &index(), "t-1"),
            Err(TranslateError::MissingSolution)
        ));
    }

    #[test]
    fn test_route_slot_outside_index_is_an_error() {
        let result: SolverResult = serde_json::from_value(json!({
            "response": {
                "solver_response": {
                    "num_vehicles": 1,
                    "solution_cost": 1.0,
                    "vehicle_data": {
                        "0": {
                            "task_id": ["d-1-p"],
                            "type": ["Pickup"],
                            "arrival_stamp": [60.0],
                            "route": [9]
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert!(matches!(
            translate(&result, &index(), "t-1"),
            Err(TranslateError::UnknownLocation { slot: 9 })
        ));
    }

    #[test]
    fn test_mismatched_arrays_are_an_error() {
        let result: SolverResult = serde_json::from_value(json!({
            "response": {
                "solver_response": {
                    "num_vehicles": 1,
                    "solution_cost": 1.0,
                    "vehicle_data": {
                        "0": {
                            "task_id": ["d-1-p", "d-1-d"],
                            "type": ["Pickup"],
                            "arrival_stamp": [60.0],
                            "route": [1]
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert!(matches!(
            translate(&result, &index(), "t-1"),
            Err(TranslateError::MismatchedArrays { .. })
        ));
    }
}
