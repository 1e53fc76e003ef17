//! Shared HTTP transport for the rentals REST API.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Status`] carrying the server's
//! `message` field, so callers can show it inline without inspecting bodies.
//! There is no retry or backoff; every request is independent.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ClientConfig, Timeouts, normalize_base_url};
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// HTTP status of a rejected request, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Base URL plus a configured `reqwest` client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] when the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::build(&config.base_url, config.timeouts)
    }

    /// Client with default timeouts, mostly for tests and scripts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] when the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::build(base_url, Timeouts::default())
    }

    fn build(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()?;
        Ok(Self { http, base_url: normalize_base_url(base_url) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get<T>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path, token);
        self.execute(Method::GET, path, request).await
    }

    pub(crate) async fn delete<T>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::DELETE, path, token);
        self.execute(Method::DELETE, path, request).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method.clone(), path, token).json(body);
        self.execute(method, path, request).await
    }

    pub(crate) async fn send_multipart<T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        form: Form,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(method.clone(), path, token).multipart(form);
        self.execute(method, path, request).await
    }

    async fn execute<T>(&self, method: Method, path: &str, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%method, path, status = status.as_u16(), "api response");

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            tracing::debug!(%method, path, status = status.as_u16(), %message, "api request rejected");
            return Err(ApiError::Status { status: status.as_u16(), message });
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

/// Message to surface for a rejected request.
///
/// Prefers the body's `message`, then `error`, then a generic status line.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"].into_iter().find_map(|key| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ToOwned::to_owned)
        })
    });
    from_body.unwrap_or_else(|| format!("request failed with status {status}"))
}

/// Reject empty path ids locally instead of hitting a collection route.
/// Dot segments are rejected too, since URL normalization would drop them.
pub(crate) fn require_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidInput("property id is required".to_owned()));
    }
    if id == "." || id == ".." {
        return Err(ApiError::InvalidInput(format!("invalid property id: {id}")));
    }
    Ok(id)
}

/// Join `segments` into an absolute path, percent-encoding each one so a
/// `/`, `?` or `#` inside a segment stays part of it.
pub(crate) fn segment_path(segments: &[&str]) -> Result<String, ApiError> {
    let mut url = Url::parse("http://localhost/").map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidInput("cannot build request path".to_owned()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_owned())
}
