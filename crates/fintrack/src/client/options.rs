//! Per-request options.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::auth::AccessToken;

/// How to issue one request through [`ApiClient::request`](crate::ApiClient::request).
///
/// ```
/// use fintrack::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::post(json!({"name": "Savings", "currency": "EUR"}));
/// assert!(!options.skip_auth);
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// JSON body; ignored for GET.
    pub body: Option<Value>,
    /// Extra headers, applied over the defaults.
    pub headers: HeaderMap,
    /// Send without a bearer token and never refresh.
    pub skip_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
            skip_auth: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).with_body(body)
    }

    pub fn patch(body: Value) -> Self {
        Self::new(Method::PATCH).with_body(body)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub(crate) fn build(
        &self,
        http: &reqwest::Client,
        url: &str,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        let mut builder = http
            .request(self.method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        builder = builder.headers(self.headers.clone());

        if self.method != Method::GET
            && let Some(body) = &self.body
        {
            builder = builder.json(body);
        }

        builder
    }
}
