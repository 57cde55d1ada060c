use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use drover_core::route::StopKind;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no pending deliveries to route")]
    NoDeliveries,

    #[error("vehicle constraints are missing a start location")]
    MissingDepot,

    #[error("vehicle start coordinates are not finite")]
    NonFiniteDepot,

    #[error("delivery {id}: missing {side} coordinates")]
    MissingCoordinates { id: String, side: StopKind },

    #[error("delivery {id}: {side} coordinates are not finite")]
    NonFiniteCoordinates { id: String, side: StopKind },

    #[error("matrix size {got} does not match location count {expected}")]
    MatrixSizeMismatch { got: usize, expected: usize },

    #[error("pickup/delivery pairing must cover every task exactly once")]
    IncompletePairing,

    #[error("payload arrays disagree with the task count")]
    InconsistentTaskArrays,
}

/// The routing request wire format.
///
/// Matrices are keyed by vehicle-type id; this client always submits a
/// single-vehicle fleet under type `"0"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPayload {
    pub cost_matrix_data: MatrixData,
    pub travel_time_matrix_data: MatrixData,
    pub fleet_data: FleetData,
    pub task_data: TaskData,
    pub solver_config: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    pub data: BTreeMap<String, Vec<Vec<f64>>>,
}

impl MatrixData {
    pub fn single_type(rows: Vec<Vec<f64>>) -> Self {
        MatrixData {
            data: BTreeMap::from([(String::from("0"), rows)]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetData {
    /// `[start_slot, end_slot]` per vehicle.
    pub vehicle_locations: Vec<[usize; 2]>,
    /// One row per cargo dimension, one column per vehicle.
    pub capacities: Vec<Vec<f64>>,
    /// Working-hours window per vehicle, epoch seconds.
    pub vehicle_time_windows: Vec<[i64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_break_time_windows: Option<Vec<Vec<[i64; 2]>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_break_durations: Option<Vec<Vec<i64>>>,
    /// Maximum driving seconds per vehicle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_max_times: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub task_locations: Vec<usize>,
    /// One row per cargo dimension, one column per task. A drop-off column is
    /// the exact negation of its pickup column.
    pub demand: Vec<Vec<f64>>,
    pub task_time_windows: Vec<[i64; 2]>,
    pub service_times: Vec<i64>,
    pub pickup_and_delivery_pairs: Vec<[usize; 2]>,
    pub prizes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub time_limit: i64,
    pub objectives: Objectives,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objectives {
    pub cost: f64,
    pub prize: f64,
}

impl OptimizationPayload {
    /// Checks the structural invariants the solver rejects requests over:
    /// every task paired exactly once, per-task arrays sized to the task
    /// count, square matrices covering every location.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let task_count = self.task_data.task_locations.len();
        let location_count = task_count + 1;

        let mut seen = vec![false; task_count];
        for pair in &self.task_data.pickup_and_delivery_pairs {
            for &task in pair {
                if task >= task_count || seen[task] {
                    return Err(ValidationError::IncompletePairing);
                }
                seen[task] = true;
            }
        }
        if seen.iter().any(|covered| !covered) {
            return Err(ValidationError::IncompletePairing);
        }

        let per_task_lengths_ok = self.task_data.task_time_windows.len() == task_count
            && self.task_data.service_times.len() == task_count
            && self.task_data.prizes.len() == task_count
            && self
                .task_data
                .demand
                .iter()
                .all(|row| row.len() == task_count);
        if !per_task_lengths_ok {
            return Err(ValidationError::InconsistentTaskArrays);
        }

        for matrix in [&self.cost_matrix_data, &self.travel_time_matrix_data] {
            for rows in matrix.data.values() {
                let square = rows.len() == location_count
                    && rows.iter().all(|row| row.len() == location_count);
                if !square {
                    return Err(ValidationError::MatrixSizeMismatch {
                        got: rows.len(),
                        expected: location_count,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_delivery_payload() -> OptimizationPayload {
        let rows = vec![vec![0.0; 3]; 3];
        OptimizationPayload {
            cost_matrix_data: MatrixData::single_type(rows.clone()),
            travel_time_matrix_data: MatrixData::single_type(rows),
            fleet_data: FleetData {
                vehicle_locations: vec![[0, 0]],
                capacities: vec![vec![6.0], vec![900.0]],
                vehicle_time_windows: vec![[0, 86_400]],
                vehicle_break_time_windows: None,
                vehicle_break_durations: None,
                vehicle_max_times: None,
            },
            task_data: TaskData {
                task_locations: vec![1, 2],
                demand: vec![vec![0.5, -0.5], vec![120.0, -120.0]],
                task_time_windows: vec![[0, 86_400], [0, 86_400]],
                service_times: vec![600, 600],
                pickup_and_delivery_pairs: vec![[0, 1]],
                prizes: vec![0.0, 95.0],
            },
            solver_config: SolverConfig {
                time_limit: 10,
                objectives: Objectives {
                    cost: 1.0,
                    prize: 1.0,
                },
            },
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(single_delivery_payload().validate().is_ok());
    }

    #[test]
    fn test_duplicated_task_in_pairing_is_rejected() {
        let mut payload = single_delivery_payload();
        payload.task_data.pickup_and_delivery_pairs = vec![[0, 0]];

        assert!(matches!(
            payload.validate(),
            Err(ValidationError::IncompletePairing)
        ));
    }

    #[test]
    fn test_uncovered_task_is_rejected() {
        let mut payload = single_delivery_payload();
        payload.task_data.pickup_and_delivery_pairs = vec![];

        assert!(matches!(
            payload.validate(),
            Err(ValidationError::IncompletePairing)
        ));
    }

    #[test]
    fn test_out_of_range_task_is_rejected() {
        let mut payload = single_delivery_payload();
        payload.task_data.pickup_and_delivery_pairs = vec![[0, 7]];

        assert!(matches!(
            payload.validate(),
            Err(ValidationError::IncompletePairing)
        ));
    }

    #[test]
    fn test_short_demand_row_is_rejected() {
        let mut payload = single_delivery_payload();
        payload.task_data.demand[1].pop();

        assert!(matches!(
            payload.validate(),
            Err(ValidationError::InconsistentTaskArrays)
        ));
    }

    #[test]
    fn test_non_square_matrix_is_rejected() {
        let mut payload = single_delivery_payload();
        payload.cost_matrix_data = MatrixData::single_type(vec![vec![0.0; 3]; 2]);

        assert!(matches!(
            payload.validate(),
            Err(ValidationError::MatrixSizeMismatch { got: 2, expected: 3 })
        ));
    }
}
