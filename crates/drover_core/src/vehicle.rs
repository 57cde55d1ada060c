use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{coordinates::Coordinates, delivery::CargoDimensions, time_window::TimeWindow};

/// One trucker's vehicle profile as configured in the app.
///
/// Read-only input to payload construction. `start` may be absent when the
/// trucker has not pinned a depot; callers are expected to fill it from the
/// device location before building a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConstraints {
    pub start: Option<Coordinates>,
    #[serde(default)]
    pub cargo_box: CargoDimensions,
    #[serde(default)]
    pub max_load_kg: f64,
    /// Working-hours window for the shift being planned.
    #[serde(default)]
    pub shift: TimeWindow,
    #[serde(default)]
    pub break_window: Option<TimeWindow>,
    #[serde(default)]
    pub break_duration: Option<SignedDuration>,
    #[serde(default)]
    pub max_driving: Option<SignedDuration>,
    #[serde(default)]
    pub fuel_km_per_liter: Option<f64>,
}

impl VehicleConstraints {
    pub fn cargo_volume_m3(&self) -> f64 {
        self.cargo_box.volume_m3()
    }

    pub fn has_break(&self) -> bool {
        self.break_window.is_some() && self.break_duration.is_some()
    }
}
