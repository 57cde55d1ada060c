use serde_json::Value;
use thiserror::Error;

use crate::coordinates::Coordinates;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

pub type ChangeListener = Box<dyn FnMut(&Value) + Send>;

/// Key-value realtime store the app keeps its shared state in.
///
/// Reads are eventually-consistent snapshots. `subscribe` hands back a
/// [`Subscription`] whose drop (or explicit cancel) detaches the listener;
/// there is no global listener registry.
pub trait RealtimeStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merges `partial`'s top-level keys into the value at `path`.
    async fn update(&self, path: &str, partial: Value) -> Result<(), StoreError>;

    fn subscribe(&self, path: &str, on_change: ChangeListener) -> Subscription;
}

/// Device geolocation collaborator.
pub trait Geolocator {
    async fn current_coordinates(&self) -> Result<Coordinates, GeolocationError>;
}

pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Store paths shared between truckers and companies.
pub mod paths {
    pub const PENDING_DELIVERIES: &str = "deliveries/pending";

    pub fn trucker_constraints(trucker_id: &str) -> String {
        format!("truckers/{trucker_id}/constraints")
    }

    pub fn trucker_route(trucker_id: &str) -> String {
        format!("truckers/{trucker_id}/route")
    }
}
