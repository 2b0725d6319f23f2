//! Persistent credential storage.
//!
//! The request client reads the access token at the start of every request
//! and writes tokens only on sign-in, refresh, and sign-out/expiry.

mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AccessToken, RefreshToken};
use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A persisted session: both tokens plus cached user fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    /// User object returned at sign-in, cached for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
    /// When this session was last written.
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            user: None,
            saved_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user: Option<serde_json::Value>) -> Self {
        self.user = user;
        self
    }

    /// Replace both tokens, keeping the cached user.
    pub fn rotate(self, access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            user: self.user,
            saved_at: Utc::now(),
        }
    }
}

/// Storage backend for the session.
///
/// Implementations must survive concurrent readers; writes are serialised by
/// the client's refresh gate.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored session, if any.
    async fn load(&self) -> Result<Option<StoredSession>, StoreError>;

    /// Replace the stored session.
    async fn save(&self, session: &StoredSession) -> Result<(), StoreError>;

    /// Remove the stored session. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_keeps_user() {
        let session = StoredSession::new(AccessToken::new("a1"), RefreshToken::new("r1"))
            .with_user(Some(serde_json::json!({"id": "u1"})));

        let rotated = session.rotate(AccessToken::new("a2"), RefreshToken::new("r2"));

        assert_eq!(rotated.access_token.as_str(), "a2");
        assert_eq!(rotated.refresh_token.as_str(), "r2");
        assert_eq!(rotated.user.unwrap()["id"], "u1");
    }

    #[test]
    fn stored_session_json_shape() {
        let session = StoredSession::new(AccessToken::new("a1"), RefreshToken::new("r1"));
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["access_token"], "a1");
        assert_eq!(json["refresh_token"], "r1");
        assert!(json.get("user").is_none());
        assert!(json["saved_at"].is_string());
    }
}
