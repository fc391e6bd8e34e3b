//! Shared HTTP client with composable request/response stages.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient::send` runs every request stage over the outgoing request, hands
//! it to the `Transport`, then runs every response stage over the outcome
//! before mapping it to `Result<HttpResponse, ApiError>`. Auth concerns
//! (bearer injection, 401 teardown) are stages; the transport only moves
//! bytes.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, TransportError};
use crate::config::ApiConfig;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One outgoing API call. `path` is relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_owned(),
            headers: vec![(CONTENT_TYPE.to_owned(), "application/json".to_owned())],
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if `body` cannot be serialized.
    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?);
        Ok(self)
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Set `name`, replacing any existing value regardless of case.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.remove_header(name);
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Moves a prepared request over the network.
pub trait Transport {
    fn send(
        &self,
        url: &str,
        request: &HttpRequest,
        timeout_ms: u32,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

/// Runs before the request is handed to the transport.
pub trait RequestStage: Send + Sync {
    fn on_request(&self, request: &mut HttpRequest);
}

/// Runs after the transport returns, before the caller sees the result.
pub trait ResponseStage: Send + Sync {
    fn on_response(&self, outcome: &Result<HttpResponse, TransportError>);
}

#[derive(Clone)]
pub struct ApiClient<T> {
    config: ApiConfig,
    transport: T,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ApiConfig, transport: T) -> Self {
        Self { config, transport, request_stages: Vec::new(), response_stages: Vec::new() }
    }

    #[must_use]
    pub fn with_request_stage<S: RequestStage + 'static>(mut self, stage: S) -> Self {
        self.request_stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn with_response_stage<S: ResponseStage + 'static>(mut self, stage: S) -> Self {
        self.response_stages.push(Arc::new(stage));
        self
    }

    /// Send `request` through the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` when no response arrived,
    /// `ApiError::Unauthorized` for 401 (after the response stages ran), and
    /// `ApiError::Status` for any other non-2xx status.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        for stage in &self.request_stages {
            stage.on_request(&mut request);
        }

        let url = self.config.url_for(&request.path);
        let outcome = self.transport.send(&url, &request, self.config.timeout_ms).await;

        for stage in &self.response_stages {
            stage.on_response(&outcome);
        }

        let response = outcome.inspect_err(|e| {
            log::warn!("{} {} failed: {e}", request.method.as_str(), request.path);
        })?;
        match response.status {
            200..=299 => Ok(response),
            401 => Err(ApiError::Unauthorized { body: response.body }),
            status => {
                log::debug!("{} {} returned {status}", request.method.as_str(), request.path);
                Err(ApiError::Status { status, body: response.body })
            }
        }
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`], plus `ApiError::Decode`.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(HttpRequest::get(path)).await?.json()
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`], plus `ApiError::Encode`/`ApiError::Decode`.
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let request = HttpRequest::post(path).with_json(body)?;
        self.send(request).await?.json()
    }
}
