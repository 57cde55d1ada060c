use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::coordinates::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    Pickup,
    Delivery,
}

impl std::fmt::Display for StopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopKind::Pickup => write!(f, "pickup"),
            StopKind::Delivery => write!(f, "delivery"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub task_id: String,
    pub kind: StopKind,
    pub arrival: Timestamp,
    pub coordinates: Coordinates,
}

/// Planned route for one vehicle, as persisted back to the store.
///
/// `total_cost` is the figure the app shows as profit. Callers must check
/// `feasible` before treating the stops as actionable: an infeasible result
/// may carry only a partial assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub vehicle_id: String,
    pub stops: Vec<Stop>,
    pub total_cost: f64,
    pub total_time: SignedDuration,
    pub feasible: bool,
}
