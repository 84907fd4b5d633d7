//! HTTP client for the SehaMaroc backend services.
//!
//! One [`ApiClient`] talks to all four services through
//! [`ServiceEndpoints`]; every call picks its service explicitly. Requests
//! carry `Authorization: Bearer <token>` once a token is set. Non-2xx
//! responses are classified into [`ApiError`] with the server's `message`
//! (or `error`) field when the body is JSON.

pub mod auth;
pub mod certificates;
pub mod notifications;
pub mod patient;
pub mod providers;
pub mod records;
pub mod requests;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{PortalConfig, ServiceEndpoints};
use crate::session::redact_token;

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach {0}")]
    Network(String),
    #[error("Session expired or invalid")]
    Unauthorized,
    #[error("Access denied{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Forbidden { message: Option<String> },
    #[error("Backend returned error (HTTP {status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided text, when the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Forbidden { message } | ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Backend service a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Patient,
    Provider,
    Requests,
    Providers,
}

/// Error body shapes the services produce: `{message}`, `{error}`, or both.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Generic `{message}` acknowledgement returned by action endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

pub struct ApiClient {
    endpoints: ServiceEndpoints,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(endpoints: ServiceEndpoints, timeout_secs: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            endpoints,
            http,
            token: None,
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, ApiError> {
        Self::new(config.endpoints.clone(), config.request_timeout_secs)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    fn base(&self, service: Service) -> &str {
        match service {
            Service::Patient => &self.endpoints.patient,
            Service::Provider => &self.endpoints.provider,
            Service::Requests => &self.endpoints.requests,
            Service::Providers => &self.endpoints.providers,
        }
    }

    fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.base(service), path)
    }

    fn request(&self, method: Method, service: Service, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(service, path))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and classify the status. Only 2xx responses come back.
    async fn execute(&self, method: Method, service: Service, path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let url = self.url(service, path);
        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_connect() {
                format!("{} (connection refused)", self.base(service))
            } else if e.is_timeout() {
                format!("{} (timed out)", self.base(service))
            } else {
                e.to_string()
            };
            tracing::error!(%method, %url, error = %e, "Transport failure");
            ApiError::Network(reason)
        })?;

        let status = response.status();
        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            token = %self.token.as_deref().map(redact_token).unwrap_or_default(),
            "Backend call"
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body);
        tracing::warn!(%method, %url, status = status.as_u16(), message = ?message, "Backend rejected call");
        Err(classify(status, message))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, service, path);
        let response = self.execute(Method::GET, service, path, builder).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, service: Service, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), service, path).json(body);
        let response = self.execute(method, service, path, builder).await?;
        decode(response).await
    }

    /// Call an action endpoint whose success body may be empty or non-JSON.
    pub(crate) async fn send_action<B>(&self, method: Method, service: Service, path: &str, body: Option<&B>) -> Result<Ack, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method.clone(), service, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(method, service, path, builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    pub(crate) async fn get_bytes(&self, service: Service, path: &str) -> Result<Vec<u8>, ApiError> {
        let builder = self.request(Method::GET, service, path);
        let response = self.execute(Method::GET, service, path, builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(parsed.error.filter(|e| !e.trim().is_empty()))
}

fn classify(status: StatusCode, message: Option<String>) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden { message },
        _ => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}
