use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::debug;

use crate::travel_matrix::TravelMatrix;

/// Maximum origins (and destinations) per matrix request. The provider
/// rejects larger batches, so an n-location matrix costs `ceil(n/25)²` calls.
pub const MATRIX_BATCH_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum MatrixApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("batch worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixRequestBody {
    /// `[latitude, longitude]` pairs.
    pub origins: Vec<[f64; 2]>,
    pub destinations: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixResponseBody {
    pub elements: Vec<MatrixElement>,
}

/// One origin/destination cell; indices are local to the request batch.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    pub origin_index: usize,
    pub destination_index: usize,
    pub condition: RouteCondition,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteCondition {
    RouteFound,
    RouteNotFound,
}

#[derive(Debug, Clone)]
pub struct MatrixApiClientParams {
    pub base_url: String,
    pub api_key: String,
}

pub struct MatrixApiClient {
    params: MatrixApiClientParams,
    client: reqwest::Client,
}

impl MatrixApiClient {
    pub fn new(params: MatrixApiClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the full pairwise matrix for `points`, batching requests to
    /// stay under the provider's per-request size limit and stitching the
    /// responses back together at their global offsets. Batches run
    /// concurrently; there is no ordering dependency between them.
    ///
    /// Cells whose element reports anything other than a found route keep
    /// their zero value.
    pub async fn fetch_matrix<P>(&self, points: &[P]) -> Result<TravelMatrix, MatrixApiError>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let coords: Vec<[f64; 2]> = points
            .iter()
            .map(|point| {
                let point: geo_types::Point = point.into();
                [point.y(), point.x()]
            })
            .collect();

        let mut matrix = TravelMatrix::zeroed(coords.len());
        if coords.is_empty() {
            return Ok(matrix);
        }

        let batches = coords.len().div_ceil(MATRIX_BATCH_SIZE);
        debug!(
            "MatrixApi: fetching {}x{} matrix in {} requests",
            coords.len(),
            coords.len(),
            batches * batches
        );

        let mut workers = JoinSet::new();
        for (origin_batch, origins) in coords.chunks(MATRIX_BATCH_SIZE).enumerate() {
            for (destination_batch, destinations) in coords.chunks(MATRIX_BATCH_SIZE).enumerate() {
                let client = self.client.clone();
                let params = self.params.clone();
                let body = MatrixRequestBody {
                    origins: origins.to_vec(),
                    destinations: destinations.to_vec(),
                };
                workers.spawn(async move {
                    let response = client
                        .post(params.base_url.as_str())
                        .query(&[("key", &params.api_key)])
                        .json(&body)
                        .send()
                        .await?;

                    if !response.status().is_success() {
                        let status = response.status().as_u16();
                        let message = response.text().await.unwrap_or_default();
                        return Err(MatrixApiError::Api { status, message });
                    }

                    let body: MatrixResponseBody = response.json().await?;
                    Ok((
                        origin_batch * MATRIX_BATCH_SIZE,
                        destination_batch * MATRIX_BATCH_SIZE,
                        body,
                    ))
                });
            }
        }

        while let Some(joined) = workers.join_next().await {
            let (row_offset, column_offset, body) = joined??;
            apply_elements(&mut matrix, row_offset, column_offset, &body.elements);
        }

        Ok(matrix)
    }
}

fn apply_elements(
    matrix: &mut TravelMatrix,
    row_offset: usize,
    column_offset: usize,
    elements: &[MatrixElement],
) {
    for element in elements {
        if element.condition != RouteCondition::RouteFound {
            continue;
        }
        let from = row_offset + element.origin_index;
        let to = column_offset + element.destination_index;
        if from >= matrix.size() || to >= matrix.size() {
            continue;
        }
        matrix.set(
            from,
            to,
            element.distance_km,
            SignedDuration::from_secs((element.duration_minutes * 60.0).round() as i64),
        );
    }
}
