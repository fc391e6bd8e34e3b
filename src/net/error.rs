//! Error types for the HTTP pipeline.
//!
//! ERROR HANDLING
//! ==============
//! `Display` output is for logs. Views show the message built by
//! `api::login_error_message`, which keeps status codes and transport details
//! out of the UI.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {0} ms")]
    Timeout(u32),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered 401; the session has already been torn down.
    #[error("credentials rejected")]
    Unauthorized { body: String },
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}
