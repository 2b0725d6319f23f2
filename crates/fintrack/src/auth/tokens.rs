//! Opaque bearer secrets issued by the auth endpoints.
//!
//! Both token kinds serialize as plain JSON strings so a stored session reads
//! back unchanged, and both print as `[REDACTED]` under `{:?}` so they never
//! reach a log line.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// The raw secret. Only for the `Authorization` header, the
            /// refresh body, and persistence.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(token: String) -> Self {
                Self(token)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "([REDACTED])"))
            }
        }
    };
}

secret_token! {
    /// Short-lived token sent as `Bearer` on every authenticated call.
    AccessToken
}

secret_token! {
    /// Long-lived token exchanged at the refresh endpoint for a new pair.
    RefreshToken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let access = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.payload.sig");
        let refresh = RefreshToken::from("rt_9f8e7d".to_string());

        assert_eq!(format!("{access:?}"), "AccessToken([REDACTED])");
        assert_eq!(format!("{refresh:?}"), "RefreshToken([REDACTED])");
    }

    #[test]
    fn serialized_as_bare_string() {
        let json = serde_json::to_string(&AccessToken::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");

        let parsed: RefreshToken = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(parsed.as_str(), "xyz");
    }

    #[test]
    fn equality_compares_secret() {
        assert_eq!(AccessToken::new("a"), AccessToken::new("a"));
        assert_ne!(AccessToken::new("a"), AccessToken::new("b"));
    }
}
