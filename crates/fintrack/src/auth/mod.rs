//! Authentication primitives.
//!
//! Token newtypes, sign-in credentials, and the single-flight refresh gate
//! that the request client uses to recover from an expired access token.

mod credentials;
mod refresh;
mod tokens;

pub use credentials::Credentials;
pub use refresh::RefreshState;
pub(crate) use refresh::{RefreshGate, RefreshOutcome};
pub use tokens::{AccessToken, RefreshToken};
