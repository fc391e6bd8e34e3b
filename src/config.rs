//! API endpoint, route, and storage-key configuration.
//!
//! A browser bundle has no runtime environment, so overrides are read at
//! build time through `option_env!`.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1/";
pub const DEFAULT_API_TIMEOUT_MS: u32 = 10_000;

/// Login entry point.
pub const LOGIN_PATH: &str = "/login";
/// Default authenticated landing view.
pub const HOME_PATH: &str = "/";

/// Persisted access token (raw string).
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Persisted refresh token (raw string, stored but never read for auth).
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Persisted user record (JSON).
pub const USER_INFO_KEY: &str = "userInfo";
/// Older builds wrote the user record here; migrated to `USER_INFO_KEY`.
pub const LEGACY_USER_KEY: &str = "user";

/// Every key derived from an authenticated session.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY, LEGACY_USER_KEY];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Absolute base URL, always ending in `/`.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_MS)
    }
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout_ms: u32) -> Self {
        Self { base_url: normalize_base_url(base_url), timeout_ms }
    }

    /// Build config from compile-time environment variables.
    ///
    /// Optional:
    /// - `FINMANAGER_API_BASE_URL`: default `http://localhost:8000/api/v1/`
    /// - `FINMANAGER_API_TIMEOUT_MS`: default 10000
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("FINMANAGER_API_BASE_URL"), option_env!("FINMANAGER_API_TIMEOUT_MS"))
    }

    fn from_values(base_url: Option<&str>, timeout_ms: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        let timeout_ms = timeout_ms
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_API_TIMEOUT_MS);
        Self::new(base_url, timeout_ms)
    }

    /// Join a relative API path onto the base URL.
    ///
    /// Absolute URLs are passed through untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}
