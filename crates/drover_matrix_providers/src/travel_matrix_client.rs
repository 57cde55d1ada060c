use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    great_circle::{FALLBACK_SPEED_KMH, great_circle_matrix},
    matrix_api::MatrixApiClient,
    travel_matrix::TravelMatrix,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TravelMatrixProvider {
    MatrixApi,
    GreatCircle { speed_kmh: f64 },
    Custom { matrix: TravelMatrix },
}

pub struct TravelMatrixClient {
    api: Option<MatrixApiClient>,
}

impl TravelMatrixClient {
    pub fn new(api: MatrixApiClient) -> Self {
        Self { api: Some(api) }
    }

    /// Client without a matrix API; every `MatrixApi` request resolves to the
    /// great-circle estimate.
    pub fn offline() -> Self {
        Self { api: None }
    }

    /// Fetches a matrix for `points`. This call never fails: any error on the
    /// primary path falls back to the great-circle estimate, so the returned
    /// matrix always has one row and column per input point.
    pub async fn fetch_matrix<P>(
        &self,
        points: &[P],
        provider: &TravelMatrixProvider,
    ) -> TravelMatrix
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        match provider {
            TravelMatrixProvider::MatrixApi => match &self.api {
                Some(api) => match api.fetch_matrix(points).await {
                    Ok(matrix) => matrix,
                    Err(error) => {
                        warn!("matrix API failed, using great-circle estimate: {error}");
                        great_circle_matrix(points, FALLBACK_SPEED_KMH)
                    }
                },
                None => {
                    warn!("no matrix API configured, using great-circle estimate");
                    great_circle_matrix(points, FALLBACK_SPEED_KMH)
                }
            },
            TravelMatrixProvider::GreatCircle { speed_kmh } => {
                great_circle_matrix(points, *speed_kmh)
            }
            TravelMatrixProvider::Custom { matrix } => matrix.clone(),
        }
    }
}
