use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{payload::OptimizationPayload, translate::SolverResult};

/// Response header carrying the job identifier of an accepted request.
pub const REQUEST_ID_HEADER: &str = "NVCF-REQID";

pub const CUOPT_DEFAULT_BASE_URL: &str = "https://optimize.api.nvidia.com/v1";
pub const CUOPT_SUBMIT_PATH: &str = "/cuopt/request";
pub const CUOPT_STATUS_PATH: &str = "/cuopt/status";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

#[derive(Debug, Error)]
pub enum CuoptError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("accepted response is missing the {REQUEST_ID_HEADER} header")]
    MissingRequestId,

    #[error("polling timed out after {0} attempts")]
    Timeout(u32),

    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CuoptClientParams {
    pub base_url: String,
    pub api_key: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl CuoptClientParams {
    pub fn new(api_key: String) -> Self {
        CuoptClientParams {
            base_url: String::from(CUOPT_DEFAULT_BASE_URL),
            api_key,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Error body shape of the remote service.
#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// Client for the hosted routing optimizer.
///
/// A submitted job either completes synchronously (the response body is the
/// terminal result) or is accepted for asynchronous processing, in which case
/// the status endpoint is polled at a fixed interval, one request in flight
/// at a time, until a terminal response or the attempt cap is reached.
pub struct CuoptClient {
    params: CuoptClientParams,
    client: reqwest::Client,
}

impl CuoptClient {
    pub fn new(params: CuoptClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn solve(&self, payload: &OptimizationPayload) -> Result<SolverResult, CuoptError> {
        let response = self
            .client
            .post(format!("{}{}", self.params.base_url, CUOPT_SUBMIT_PATH))
            .bearer_auth(&self.params.api_key)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::ACCEPTED => {
                let request_id = response
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
                    .ok_or(CuoptError::MissingRequestId)?;

                debug!("CuoptApi: request accepted, polling job {request_id}");
                self.poll_until_completed(&request_id).await
            }
            status if status.is_success() => parse_terminal(response).await,
            _ => Err(api_error(response).await),
        }
    }

    async fn poll_until_completed(&self, request_id: &str) -> Result<SolverResult, CuoptError> {
        for attempt in 1..=self.params.max_poll_attempts {
            debug!(
                "CuoptApi: polling for job completion {}/{}",
                attempt, self.params.max_poll_attempts
            );
            if let Some(result) = self.poll_once(request_id).await? {
                return Ok(result);
            }

            tokio::time::sleep(self.params.poll_interval).await;
        }

        Err(CuoptError::Timeout(self.params.max_poll_attempts))
    }

    async fn poll_once(&self, request_id: &str) -> Result<Option<SolverResult>, CuoptError> {
        let response = self
            .client
            .get(format!(
                "{}{}/{}",
                self.params.base_url, CUOPT_STATUS_PATH, request_id
            ))
            .bearer_auth(&self.params.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(None),
            status if status.is_success() => parse_terminal(response).await.map(Some),
            _ => Err(api_error(response).await),
        }
    }
}

async fn parse_terminal(response: reqwest::Response) -> Result<SolverResult, CuoptError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

async fn api_error(response: reqwest::Response) -> CuoptError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorDetail>(&body)
        .map(|error| error.detail)
        .unwrap_or(body);
    CuoptError::Api { status, message }
}

/// Seam between orchestration and the hosted solver.
pub trait OptimizationBackend {
    async fn solve(&self, payload: &OptimizationPayload) -> Result<SolverResult, CuoptError>;
}

impl OptimizationBackend for CuoptClient {
    async fn solve(&self, payload: &OptimizationPayload) -> Result<SolverResult, CuoptError> {
        CuoptClient::solve(self, payload).await
    }
}
