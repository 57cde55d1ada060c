use thiserror::Error;

use drover_core::store::{GeolocationError, StoreError};
use drover_optimizer_client::{
    cuopt_api::CuoptError, payload::ValidationError, translate::TranslateError,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no pending deliveries to plan")]
    NoPendingDeliveries,

    #[error("trucker {trucker_id} has no vehicle constraints configured")]
    MissingConstraints { trucker_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("stored document is malformed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Solver(#[from] CuoptError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl DispatchError {
    /// Remediation hint for failures with a known cause. The UI renders the
    /// error message verbatim and appends this when present.
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            DispatchError::MissingConstraints { .. } => {
                Some("complete the vehicle setup screen before planning a route")
            }
            DispatchError::Validation(ValidationError::MissingDepot) => {
                Some("set the vehicle start location or enable device location")
            }
            DispatchError::Geolocation(GeolocationError::PermissionDenied) => {
                Some("grant the app location access or set a start location manually")
            }
            DispatchError::Solver(CuoptError::Api {
                status: 401 | 403, ..
            }) => Some("check the optimizer API credential"),
            DispatchError::Solver(CuoptError::Timeout(_)) => {
                Some("the optimization service is busy, try again in a few minutes")
            }
            _ => None,
        }
    }
}
