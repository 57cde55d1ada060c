use jiff::SignedDuration;

use drover_core::{
    delivery::Delivery,
    demand::Demand,
    location::LocationIndex,
    route::StopKind,
    vehicle::VehicleConstraints,
};
use drover_matrix_providers::{
    travel_matrix::TravelMatrix,
    travel_matrix_client::{TravelMatrixClient, TravelMatrixProvider},
};

use crate::payload::{
    FleetData, MatrixData, Objectives, OptimizationPayload, SolverConfig, TaskData,
    ValidationError,
};

#[derive(Debug, Clone)]
pub struct PayloadDefaults {
    /// Service time assumed when a delivery does not specify one.
    pub service_duration: SignedDuration,
    /// Shift length assumed when the vehicle has no working-hours window.
    pub horizon: SignedDuration,
    pub solve_time_limit: SignedDuration,
    pub cost_objective: f64,
    pub prize_objective: f64,
}

impl Default for PayloadDefaults {
    fn default() -> Self {
        PayloadDefaults {
            service_duration: SignedDuration::from_mins(10),
            horizon: SignedDuration::from_hours(24),
            solve_time_limit: SignedDuration::from_secs(10),
            cost_objective: 1.0,
            prize_objective: 1.0,
        }
    }
}

/// Builds routing request payloads from pending deliveries and one vehicle's
/// constraints.
///
/// Aside from the matrix fetch this is a pure transform: identical inputs and
/// an identical matrix produce a byte-identical payload.
pub struct PayloadBuilder {
    matrix_client: TravelMatrixClient,
    provider: TravelMatrixProvider,
    defaults: PayloadDefaults,
}

impl PayloadBuilder {
    pub fn new(matrix_client: TravelMatrixClient, provider: TravelMatrixProvider) -> Self {
        PayloadBuilder {
            matrix_client,
            provider,
            defaults: PayloadDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: PayloadDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &PayloadDefaults {
        &self.defaults
    }

    /// Validates the inputs, fetches the travel matrix, and assembles the
    /// request. Input validation happens before any network call.
    pub async fn build(
        &self,
        deliveries: &[Delivery],
        constraints: &VehicleConstraints,
    ) -> Result<(OptimizationPayload, LocationIndex), ValidationError> {
        let index = build_location_index(deliveries, constraints)?;
        let matrix = self
            .matrix_client
            .fetch_matrix(index.locations(), &self.provider)
            .await;
        let payload = assemble_payload(deliveries, constraints, &index, &matrix, &self.defaults)?;
        payload.validate()?;
        Ok((payload, index))
    }
}

/// Depot first, then one pickup/drop-off pair per delivery in input order.
pub fn build_location_index(
    deliveries: &[Delivery],
    constraints: &VehicleConstraints,
) -> Result<LocationIndex, ValidationError> {
    if deliveries.is_empty() {
        return Err(ValidationError::NoDeliveries);
    }

    let depot = constraints.start.ok_or(ValidationError::MissingDepot)?;
    if !depot.is_finite() {
        return Err(ValidationError::NonFiniteDepot);
    }

    let mut index = LocationIndex::with_depot(depot);
    for delivery in deliveries {
        let pickup = delivery
            .pickup
            .ok_or_else(|| ValidationError::MissingCoordinates {
                id: delivery.id.clone(),
                side: StopKind::Pickup,
            })?;
        if !pickup.is_finite() {
            return Err(ValidationError::NonFiniteCoordinates {
                id: delivery.id.clone(),
                side: StopKind::Pickup,
            });
        }
        let dropoff = delivery
            .dropoff
            .ok_or_else(|| ValidationError::MissingCoordinates {
                id: delivery.id.clone(),
                side: StopKind::Delivery,
            })?;
        if !dropoff.is_finite() {
            return Err(ValidationError::NonFiniteCoordinates {
                id: delivery.id.clone(),
                side: StopKind::Delivery,
            });
        }
        index.push_pair(pickup, dropoff);
    }

    Ok(index)
}

pub fn assemble_payload(
    deliveries: &[Delivery],
    constraints: &VehicleConstraints,
    index: &LocationIndex,
    matrix: &TravelMatrix,
    defaults: &PayloadDefaults,
) -> Result<OptimizationPayload, ValidationError> {
    if matrix.size() != index.len() {
        return Err(ValidationError::MatrixSizeMismatch {
            got: matrix.size(),
            expected: index.len(),
        });
    }

    let task_count = index.task_count();
    let shift_start = constraints.shift.start_seconds(0);
    let shift_end = clamp_end(shift_start, constraints.shift.end_seconds(shift_start + defaults.horizon.as_secs()));

    let capacity = Demand::from_slice(&[constraints.cargo_volume_m3(), constraints.max_load_kg]);
    let dimensions = capacity.len();

    let mut task_locations = Vec::with_capacity(task_count);
    let mut demand_rows = vec![Vec::with_capacity(task_count); dimensions];
    let mut task_time_windows = Vec::with_capacity(task_count);
    let mut service_times = Vec::with_capacity(task_count);
    let mut pairs = Vec::with_capacity(deliveries.len());
    let mut prizes = Vec::with_capacity(task_count);

    for (ordinal, delivery) in deliveries.iter().enumerate() {
        let pickup_task = LocationIndex::pickup_task(ordinal);
        let delivery_task = LocationIndex::delivery_task(ordinal);
        pairs.push([pickup_task.get(), delivery_task.get()]);

        task_locations.push(LocationIndex::task_slot(pickup_task).get());
        task_locations.push(LocationIndex::task_slot(delivery_task).get());

        // The drop-off demand is the exact negation of its pickup, which is
        // how the solver tracks onboard load across the pairing.
        let picked_up = Demand::from_slice(&[delivery.volume_m3(), delivery.weight_kg]);
        let dropped_off = picked_up.negated();
        for (dimension, row) in demand_rows.iter_mut().enumerate() {
            row.push(picked_up.get(dimension));
            row.push(dropped_off.get(dimension));
        }

        let window_start = delivery.window.start_seconds(shift_start);
        let window_end = clamp_end(window_start, delivery.window.end_seconds(shift_end));
        task_time_windows.push([window_start, window_end]);
        task_time_windows.push([window_start, window_end]);

        let service = delivery
            .service_duration
            .unwrap_or(defaults.service_duration)
            .as_secs();
        service_times.push(service);
        service_times.push(service);

        // The prize is realized at the drop-off.
        prizes.push(0.0);
        prizes.push(delivery.prize);
    }

    let break_window = constraints
        .break_window
        .as_ref()
        .filter(|_| constraints.has_break())
        .map(|window| {
            let start = window.start_seconds(shift_start);
            [start, clamp_end(start, window.end_seconds(shift_end))]
        });

    let fleet_data = FleetData {
        vehicle_locations: vec![[
            LocationIndex::DEPOT_SLOT.get(),
            LocationIndex::DEPOT_SLOT.get(),
        ]],
        capacities: capacity.iter().map(|dimension| vec![dimension]).collect(),
        vehicle_time_windows: vec![[shift_start, shift_end]],
        vehicle_break_time_windows: break_window.map(|window| vec![vec![window]]),
        vehicle_break_durations: constraints
            .break_duration
            .filter(|_| constraints.has_break())
            .map(|duration| vec![vec![duration.as_secs()]]),
        vehicle_max_times: constraints
            .max_driving
            .map(|duration| vec![duration.as_secs()]),
    };

    Ok(OptimizationPayload {
        cost_matrix_data: MatrixData::single_type(matrix.distance_rows()),
        travel_time_matrix_data: MatrixData::single_type(matrix.duration_rows_secs()),
        fleet_data,
        task_data: TaskData {
            task_locations,
            demand: demand_rows,
            task_time_windows,
            service_times,
            pickup_and_delivery_pairs: pairs,
            prizes,
        },
        solver_config: SolverConfig {
            time_limit: defaults.solve_time_limit.as_secs(),
            objectives: Objectives {
                cost: defaults.cost_objective,
                prize: defaults.prize_objective,
            },
        },
    })
}

fn clamp_end(start: i64, end: i64) -> i64 {
    end.max(start)
}
