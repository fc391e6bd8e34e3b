//! REST calls owned by the session layer.
//!
//! ERROR HANDLING
//! ==============
//! `sign_in` returns a display-ready message on failure. Server-supplied
//! messages (`non_field_errors`, `detail`, or a bare string body) are shown as
//! given; everything else maps to a fixed plain-language string.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::error::ApiError;
use super::http::{ApiClient, Transport};
use super::types::{LoginRequest, LoginResponse};
use crate::config::REFRESH_TOKEN_KEY;
use crate::state::auth::Session;

pub const LOGIN_ENDPOINT: &str = "auth/login";

const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please check your credentials and try again.";

/// Exchange credentials for tokens via `POST auth/login`.
///
/// # Errors
///
/// Returns an `ApiError` if the request fails or the response lacks an
/// access token.
pub async fn login<T: Transport>(client: &ApiClient<T>, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let resp: LoginResponse = client.post_json(LOGIN_ENDPOINT, &LoginRequest { email, password }).await?;
    if resp.access.trim().is_empty() {
        return Err(ApiError::Decode("login response has an empty access token".to_owned()));
    }
    Ok(resp)
}

/// Log in and commit the returned credentials to `session`.
///
/// On success the session navigates to the home view.
///
/// # Errors
///
/// Returns a user-facing message if the request or session commit fails.
pub async fn sign_in<T: Transport>(
    client: &ApiClient<T>,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<(), String> {
    let resp = login(client, email, password).await.map_err(|e| {
        log::warn!("login request failed: {e}");
        login_error_message(&e)
    })?;
    if let Err(e) = session.login(&resp.access, resp.user) {
        log::error!("could not commit session: {e}");
        return Err("Login failed. Your session could not be saved in this browser.".to_owned());
    }
    if let Some(refresh) = resp.refresh.as_deref().filter(|r| !r.trim().is_empty()) {
        session.store().write_text(REFRESH_TOKEN_KEY, refresh);
    }
    Ok(())
}

/// Message to show for a failed login request.
pub fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized { body } | ApiError::Status { body, .. } => {
            server_message(body).unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_owned())
        }
        ApiError::Transport(_) => "Login failed. No response from server.".to_owned(),
        ApiError::Decode(_) => "Login failed. Unexpected response from server.".to_owned(),
        ApiError::Encode(_) => GENERIC_LOGIN_FAILURE.to_owned(),
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(errors) = value.get("non_field_errors").and_then(|v| v.as_array()) {
        let joined = errors.iter().filter_map(|e| e.as_str()).collect::<Vec<_>>().join(" ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    if let Some(detail) = value.get("detail").and_then(|v| v.as_str()) {
        return Some(detail.to_owned());
    }
    value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_owned)
}
