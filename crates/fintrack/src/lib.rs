//! fintrack - API request client for the fintrack personal-finance backend.
//!
//! All calls to the backend flow through an [`ApiClient`]. The client attaches
//! the stored bearer token, transparently refreshes an expired access token
//! (one refresh at a time, shared by every caller that hit a 401), retries the
//! original request once, and folds every outcome into an [`ApiResponse`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fintrack::{ApiClient, BaseUrl, ClientConfig, Credentials, MemoryStore};
//!
//! # async fn example() -> Result<(), fintrack::Error> {
//! let config = ClientConfig::new(BaseUrl::new("https://api.fintrack.app")?);
//! let client = ApiClient::new(config, Arc::new(MemoryStore::new()))?;
//!
//! let _expired = client.on_session_expired(|| eprintln!("please sign in again"));
//!
//! client.sign_in(Credentials::new("alice@example.com", "secret")).await;
//! let wallets = client.get("/wallets").await;
//! if wallets.success {
//!     println!("{:?}", wallets.data);
//! } else if wallets.needs_login {
//!     println!("session lost");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod store;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, Credentials, RefreshState, RefreshToken};
pub use client::{ApiClient, ApiResponse, BaseUrl, ClientConfig, RequestOptions, UploadForm};
pub use error::Error;
pub use events::{SessionEvents, Subscription};
pub use store::{CredentialStore, FileStore, MemoryStore, StoredSession};

// Request-building types callers need for custom methods and headers
pub use reqwest::{Method, header};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
