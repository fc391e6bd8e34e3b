//! Networking modules for the REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` is the stage pipeline every call goes through, `interceptors` holds
//! the auth stages, `api` the session-owned endpoints, and `types` the wire
//! schema. `gloo_transport` is the browser transport.

pub mod api;
pub mod error;
#[cfg(feature = "hydrate")]
pub mod gloo_transport;
pub mod http;
pub mod interceptors;
pub mod types;
