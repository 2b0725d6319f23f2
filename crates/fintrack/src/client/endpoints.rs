//! Authentication endpoints and their wire types.

use serde::{Deserialize, Serialize};

/// POST: open a session with email and password.
pub const LOGIN: &str = "/auth/login";

/// POST: exchange a refresh token for a new token pair.
pub const REFRESH: &str = "/auth/refresh";

/// POST: revoke the current session server-side.
pub const LOGOUT: &str = "/auth/logout";

/// Request body for `/auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response envelope from `/auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub data: SessionData,
}

/// `data` of a login response; also the `data` of a refresh response.
#[derive(Debug, Deserialize)]
pub struct SessionData {
    pub session: SessionTokens,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Token pair as issued by the backend.
#[derive(Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
