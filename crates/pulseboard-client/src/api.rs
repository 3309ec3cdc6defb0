//! Typed access to the `/api/v1` REST surface.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use pulseboard_core::error::ValidationError;
use pulseboard_core::metrics::{
    CampaignConversion, HealthStatus, NewCampaignConversion, NewOverviewMetrics,
    NewRevenueDataPoint, OverviewMetrics, RevenueDataPoint,
};

use crate::config::ClientConfig;

/// How a failed call should be treated by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Worth another attempt: the server answered but refused or garbled
    /// this particular request.
    Transient,
    /// The backend is unavailable. Retrying only delays the fallback.
    Permanent,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    #[error("client error: HTTP {status}: {message}")]
    Client { status: u16, message: String },

    #[error("undecodable response body: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent.
    #[error("invalid payload: {0}")]
    Invalid(#[from] ValidationError),
}

impl ApiError {
    pub fn class(&self) -> FailureClass {
        match self {
            ApiError::Transport(_) | ApiError::Timeout | ApiError::Server { .. } => {
                FailureClass::Permanent
            }
            ApiError::Client { .. } | ApiError::Decode(_) | ApiError::Invalid(_) => {
                FailureClass::Transient
            }
        }
    }

    /// The request itself was at fault. Writes surface these to the caller
    /// instead of echoing locally.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Client { .. } | ApiError::Invalid(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status } | ApiError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// One method per REST operation.
#[async_trait]
pub trait DashboardApi: Send + Sync + 'static {
    async fn latest_overview(&self) -> Result<OverviewMetrics, ApiError>;
    async fn overview_history(&self) -> Result<Vec<OverviewMetrics>, ApiError>;
    async fn create_overview(&self, new: &NewOverviewMetrics) -> Result<OverviewMetrics, ApiError>;

    async fn campaigns(&self) -> Result<Vec<CampaignConversion>, ApiError>;
    async fn create_campaign(
        &self,
        new: &NewCampaignConversion,
    ) -> Result<CampaignConversion, ApiError>;

    async fn revenue(&self) -> Result<Vec<RevenueDataPoint>, ApiError>;
    async fn create_revenue(&self, new: &NewRevenueDataPoint)
        -> Result<RevenueDataPoint, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`DashboardApi`] over HTTP.
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_server_error() {
        return Err(ApiError::Server {
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(client_error(status, &body));
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn client_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());
    ApiError::Client {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn latest_overview(&self) -> Result<OverviewMetrics, ApiError> {
        self.get_json("overview/latest").await
    }

    async fn overview_history(&self) -> Result<Vec<OverviewMetrics>, ApiError> {
        self.get_json("overview").await
    }

    async fn create_overview(&self, new: &NewOverviewMetrics) -> Result<OverviewMetrics, ApiError> {
        self.post_json("overview", new).await
    }

    async fn campaigns(&self) -> Result<Vec<CampaignConversion>, ApiError> {
        self.get_json("campaigns").await
    }

    async fn create_campaign(
        &self,
        new: &NewCampaignConversion,
    ) -> Result<CampaignConversion, ApiError> {
        self.post_json("campaigns", new).await
    }

    async fn revenue(&self) -> Result<Vec<RevenueDataPoint>, ApiError> {
        self.get_json("revenue").await
    }

    async fn create_revenue(
        &self,
        new: &NewRevenueDataPoint,
    ) -> Result<RevenueDataPoint, ApiError> {
        self.post_json("revenue", new).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_availability() {
        assert_eq!(ApiError::Timeout.class(), FailureClass::Permanent);
        assert_eq!(
            ApiError::Transport("connection refused".into()).class(),
            FailureClass::Permanent
        );
        assert_eq!(ApiError::Server { status: 503 }.class(), FailureClass::Permanent);
        assert_eq!(
            ApiError::Client {
                status: 404,
                message: String::new()
            }
            .class(),
            FailureClass::Transient
        );
        assert_eq!(ApiError::Decode("eof".into()).class(), FailureClass::Transient);
    }

    #[test]
    fn only_request_faults_are_client_errors() {
        assert!(ApiError::Client {
            status: 400,
            message: "bad".into()
        }
        .is_client_error());
        assert!(ApiError::Invalid(ValidationError::Empty { field: "campaign" }).is_client_error());
        assert!(!ApiError::Server { status: 500 }.is_client_error());
        assert!(!ApiError::Timeout.is_client_error());
    }

    #[test]
    fn client_error_reads_envelope_message() {
        let body = br#"{"error":{
            "code":"validation_error",
            "message":"revenue must not be negative",
            "field":"revenue"
        }}"#;
        match client_error(StatusCode::BAD_REQUEST, body) {
            ApiError::Client { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "revenue must not be negative");
            }
            other => panic!("unexpected {other:?}"),
        }
        match client_error(StatusCode::NOT_FOUND, b" plain text ") {
            ApiError::Client { message, .. } => assert_eq!(message, "plain text"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
