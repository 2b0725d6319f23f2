//! Client configuration and base URL type.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// The URL must be absolute and use HTTPS (or HTTP for localhost). A trailing
/// slash is dropped so that endpoint paths concatenate cleanly.
///
/// # Example
///
/// ```
/// use fintrack::BaseUrl;
///
/// let base = BaseUrl::new("https://api.fintrack.app/v1/").unwrap();
/// assert_eq!(base.endpoint_url("/wallets"), "https://api.fintrack.app/v1/wallets");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path: `"{BASE_URL}{endpoint}"`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        if endpoint.is_empty() || endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

        let problem = match url.scheme() {
            _ if url.cannot_be_a_base() => Some("must be an absolute URL"),
            "https" => None,
            "http" if loopback => None,
            _ => Some("must use HTTPS (HTTP allowed only for localhost)"),
        }
        .or_else(|| {
            (url.query().is_some() || url.fragment().is_some())
                .then_some("must not carry a query or fragment")
        });

        match problem {
            Some(reason) => Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str().trim_end_matches('/'))
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: BaseUrl,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Per-request timeout used unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("fintrack/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Total timeout for each HTTP call, including the refresh call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let base = BaseUrl::new("https://api.fintrack.app").unwrap();
        assert_eq!(base.host(), Some("api.fintrack.app"));
    }

    #[test]
    fn valid_localhost_http() {
        let base = BaseUrl::new("http://localhost:3000").unwrap();
        assert_eq!(base.host(), Some("localhost"));
    }

    #[test]
    fn endpoint_concatenation() {
        let base = BaseUrl::new("https://api.fintrack.app").unwrap();
        assert_eq!(
            base.endpoint_url("/auth/refresh"),
            "https://api.fintrack.app/auth/refresh"
        );
    }

    #[test]
    fn endpoint_concatenation_keeps_base_path() {
        let base = BaseUrl::new("https://api.fintrack.app/api/").unwrap();
        assert_eq!(
            base.endpoint_url("/wallets?limit=5"),
            "https://api.fintrack.app/api/wallets?limit=5"
        );
        assert_eq!(
            base.endpoint_url("goals"),
            "https://api.fintrack.app/api/goals"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(BaseUrl::new("http://api.fintrack.app").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(BaseUrl::new("/wallets").is_err());
    }

    #[test]
    fn invalid_query_in_base() {
        assert!(BaseUrl::new("https://api.fintrack.app/?x=1").is_err());
    }

    #[test]
    fn config_defaults_and_overrides() {
        let base = BaseUrl::new("https://api.fintrack.app").unwrap();
        let config = ClientConfig::new(base);
        assert_eq!(config.timeout(), ClientConfig::DEFAULT_TIMEOUT);
        assert!(config.user_agent().starts_with("fintrack/"));

        let config = config
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("fintrack-mobile/2.0");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent(), "fintrack-mobile/2.0");
    }
}
