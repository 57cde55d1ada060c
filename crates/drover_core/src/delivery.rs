use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{coordinates::Coordinates, time_window::TimeWindow};

/// Cargo box dimensions in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CargoDimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl CargoDimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        CargoDimensions {
            length_cm,
            width_cm,
            height_cm,
        }
    }

    pub fn volume_m3(&self) -> f64 {
        self.length_cm * self.width_cm * self.height_cm / 1_000_000.0
    }
}

/// A pending delivery as published by the scheduling backend.
///
/// Read-only input: this core never mutates deliveries, it only reads them
/// while assembling a routing request. Coordinates are optional because the
/// publishing side does not guarantee them; validation happens before any
/// network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub pickup: Option<Coordinates>,
    pub dropoff: Option<Coordinates>,
    #[serde(default)]
    pub dimensions: CargoDimensions,
    #[serde(default)]
    pub weight_kg: f64,
    /// Payment offered for completing the delivery.
    #[serde(default)]
    pub prize: f64,
    #[serde(default)]
    pub service_duration: Option<SignedDuration>,
    #[serde(default)]
    pub window: TimeWindow,
}

impl Delivery {
    pub fn volume_m3(&self) -> f64 {
        self.dimensions.volume_m3()
    }
}
