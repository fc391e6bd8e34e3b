//! Wire DTOs for the auth endpoints.
//!
//! DESIGN
//! ======
//! Finance payloads (accounts, categories, transactions) belong to the views
//! that fetch them; only the shapes the session layer itself handles live here.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// The signed-in user as returned by `POST auth/login` and persisted under
/// `userInfo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Backend user id. Older payloads name it `pk`.
    #[serde(alias = "pk", deserialize_with = "deserialize_i64_from_number")]
    pub id: i64,
    /// Login email.
    pub email: String,
}

/// Body of `POST auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful `POST auth/login` response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Access token sent as the bearer credential.
    pub access: String,
    /// Refresh token. Persisted, never used to refresh.
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: UserInfo,
}

fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err(D::Error::custom(format!("expected integer id, got {number}")))
        }
        serde_json::Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected integer id, got {text:?}"))),
        other => Err(D::Error::custom(format!("expected integer id, got {other}"))),
    }
}
