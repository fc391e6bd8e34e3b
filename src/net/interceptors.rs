//! Auth stages for the shared `ApiClient`.
//!
//! SYSTEM CONTEXT
//! ==============
//! `BearerAuth` reads the session on every request, so a login that happens
//! after the client was built applies to the very next call.
//! `UnauthorizedTeardown` clears the session synchronously when the server
//! answers 401, before the caller's future resolves, so no later request can
//! reuse the rejected token. Neither stage retries or refreshes.

#[cfg(test)]
#[path = "interceptors_test.rs"]
mod interceptors_test;

use super::error::TransportError;
use super::http::{AUTHORIZATION, ApiClient, HttpRequest, HttpResponse, RequestStage, ResponseStage, Transport};
use crate::config::ApiConfig;
use crate::state::auth::{Session, normalize_token};

pub const UNAUTHORIZED: u16 = 401;

/// `Authorization` header value for `token`.
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

pub struct BearerAuth {
    session: Session,
}

impl BearerAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl RequestStage for BearerAuth {
    fn on_request(&self, request: &mut HttpRequest) {
        match self.session.token().as_deref().and_then(normalize_token) {
            Some(token) => request.set_header(AUTHORIZATION, &bearer_value(&token)),
            None => request.remove_header(AUTHORIZATION),
        }
    }
}

pub struct UnauthorizedTeardown {
    session: Session,
}

impl UnauthorizedTeardown {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl ResponseStage for UnauthorizedTeardown {
    fn on_response(&self, outcome: &Result<HttpResponse, TransportError>) {
        if let Ok(response) = outcome
            && response.status == UNAUTHORIZED
        {
            self.session.teardown();
        }
    }
}

/// Client wired with bearer injection before send and 401 teardown after.
pub fn authorized_client<T: Transport>(config: ApiConfig, transport: T, session: &Session) -> ApiClient<T> {
    ApiClient::new(config, transport)
        .with_request_stage(BearerAuth::new(session.clone()))
        .with_response_stage(UnauthorizedTeardown::new(session.clone()))
}
