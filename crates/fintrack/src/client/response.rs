//! Uniform result envelope and HTTP response classification.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

/// Message returned when the refresh protocol gave up on the session.
pub(crate) const SESSION_EXPIRED: &str = "Session expired";

/// Outcome of one client call.
///
/// Every expected failure (no token, rejected session, transport error,
/// malformed response, business error) is reported here rather than as an
/// `Err`. Branch on [`success`](Self::success) and
/// [`needs_login`](Self::needs_login).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The caller must send the user through sign-in before retrying.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_login: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            needs_login: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            needs_login: false,
        }
    }

    /// A failure that requires the user to sign in again.
    pub fn login_required(message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message,
            needs_login: true,
        }
    }

    pub(crate) fn session_expired() -> Self {
        Self::login_required(Some(SESSION_EXPIRED.to_string()))
    }
}

impl ApiResponse<Value> {
    /// Deserialize `data` into a concrete type.
    ///
    /// A successful response whose data does not match `T` becomes a failure
    /// carrying the decode error.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        let data = match self.data {
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => Some(data),
                Err(e) => {
                    return ApiResponse {
                        success: false,
                        data: None,
                        message: Some(format!("Unexpected response data: {e}")),
                        needs_login: self.needs_login,
                    };
                }
            },
            None => None,
        };

        ApiResponse {
            success: self.success,
            data,
            message: self.message,
            needs_login: self.needs_login,
        }
    }
}

/// Turn an HTTP response into an [`ApiResponse`].
///
/// 401 and 403 always set `needs_login`; the refresh decision is made before
/// this point.
pub(crate) async fn classify(response: reqwest::Response) -> ApiResponse {
    let status = response.status();
    let auth_rejected = is_auth_rejection(status);

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    if !is_json {
        warn!(status = status.as_u16(), "Non-JSON response from server");
        return ApiResponse {
            success: false,
            data: None,
            message: Some(format!(
                "Unexpected response from server (HTTP {})",
                status.as_u16()
            )),
            needs_login: auth_rejected,
        };
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read response body");
            return ApiResponse {
                needs_login: auth_rejected,
                ..ApiResponse::failure(format!(
                    "Failed to read response (HTTP {}): {e}",
                    status.as_u16()
                ))
            };
        }
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => from_payload(status, payload),
        Err(e) => {
            warn!(status = status.as_u16(), error = %e, "Unparsable JSON response");
            ApiResponse {
                needs_login: auth_rejected,
                ..ApiResponse::failure(format!(
                    "Invalid JSON response (HTTP {}): {e}",
                    status.as_u16()
                ))
            }
        }
    }
}

/// Classify a decoded JSON payload.
///
/// On 2xx, `data` is the payload's `data` member when the key exists, else
/// the whole payload. An explicit `"data": null` counts as present and
/// yields no data rather than echoing the envelope back.
pub(crate) fn from_payload(status: StatusCode, payload: Value) -> ApiResponse {
    trace!(status = %status, "Classifying JSON payload");

    let message = string_field(&payload, "message");

    if !status.is_success() {
        let message = message
            .or_else(|| string_field(&payload, "error"))
            .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16()));
        return ApiResponse {
            needs_login: is_auth_rejection(status),
            ..ApiResponse::failure(message)
        };
    }

    let success = payload
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let data = match payload {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data"),
        other => Some(other),
    }
    .filter(|v| !v.is_null());

    ApiResponse {
        success,
        data,
        message,
        needs_login: false,
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_unwraps_data() {
        let response = from_payload(
            StatusCode::OK,
            json!({"success": true, "data": {"wallets": [{"id": 1}]}, "message": "ok"}),
        );

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"wallets": [{"id": 1}]})));
        assert_eq!(response.message.as_deref(), Some("ok"));
        assert!(!response.needs_login);
    }

    #[test]
    fn success_without_data_returns_raw_payload() {
        let response = from_payload(StatusCode::OK, json!({"rates": {"EUR": 0.9}}));

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"rates": {"EUR": 0.9}})));
    }

    #[test]
    fn explicit_null_data_is_empty() {
        let response = from_payload(
            StatusCode::OK,
            json!({"success": true, "data": null, "message": "Goal deleted"}),
        );

        assert!(response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.message.as_deref(), Some("Goal deleted"));
    }

    #[test]
    fn business_failure_passes_through() {
        let response = from_payload(
            StatusCode::OK,
            json!({"success": false, "message": "Wallet name already used"}),
        );

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Wallet name already used"));
        assert!(!response.needs_login);
    }

    #[test]
    fn error_status_prefers_payload_message() {
        let response = from_payload(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"success": false, "message": "amount must be positive"}),
        );
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("amount must be positive"));

        let response = from_payload(StatusCode::NOT_FOUND, json!({"error": "Not Found"}));
        assert_eq!(response.message.as_deref(), Some("Not Found"));

        let response = from_payload(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
        assert!(response.message.unwrap().contains("500"));
    }

    #[test]
    fn forbidden_needs_login() {
        let response = from_payload(StatusCode::FORBIDDEN, json!({"message": "forbidden"}));
        assert!(!response.success);
        assert!(response.needs_login);
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/html; charset=utf-8"));
        assert!(!is_json_content_type("text/plain"));
    }

    #[test]
    fn serialized_shape_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::<Value>::failure("boom")).unwrap();
        assert_eq!(json, json!({"success": false, "message": "boom"}));

        let json = serde_json::to_value(ApiResponse::<Value>::session_expired()).unwrap();
        assert_eq!(
            json,
            json!({"success": false, "message": "Session expired", "needsLogin": true})
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Wallet {
        id: u32,
        name: String,
    }

    #[test]
    fn decode_typed_data() {
        let response = ApiResponse::ok(Some(json!({"id": 7, "name": "Cash"})), None);
        let typed = response.decode::<Wallet>();
        assert!(typed.success);
        assert_eq!(
            typed.data,
            Some(Wallet {
                id: 7,
                name: "Cash".to_string()
            })
        );

        let response = ApiResponse::ok(Some(json!({"id": "x"})), None);
        let typed = response.decode::<Wallet>();
        assert!(!typed.success);
        assert!(typed.message.unwrap().starts_with("Unexpected response data"));
    }
}
