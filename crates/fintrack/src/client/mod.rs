//! The API request client.
//!
//! [`ApiClient`] issues one logical request per call. Authenticated calls go
//! through two explicit phases: an attempt with the stored access token, and,
//! only if that attempt was answered with 401, a single-flight refresh
//! followed by exactly one retry with the new token.

mod config;
mod endpoints;
mod options;
mod response;
mod upload;

use std::sync::Arc;

use futures_util::FutureExt;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::{
    AccessToken, Credentials, RefreshGate, RefreshOutcome, RefreshState, RefreshToken,
};
use crate::error::{AuthError, Error, TransportError};
use crate::events::{SessionEvents, Subscription};
use crate::store::{CredentialStore, StoredSession};

use endpoints::{LOGIN, LOGOUT, REFRESH, RefreshRequest, RefreshResponse, SessionData};
use response::classify;

pub use config::{BaseUrl, ClientConfig};
pub use options::RequestOptions;
pub use response::ApiResponse;
pub use upload::UploadForm;

/// HTTP client for the fintrack API.
///
/// Cheap to clone (internal `Arc`) and safe to share across tasks. All clones
/// share the credential store, the session-expired listeners, and the
/// refresh gate, so at most one refresh call is in flight per client no
/// matter how many requests were rejected at once.
///
/// Dropping a request future cancels that request, including a pending
/// retry. A refresh that other callers are waiting on keeps running.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    events: SessionEvents,
    refresh: RefreshGate,
}

/// What a request rejected with 401 should do next.
enum Recovery {
    Retry(AccessToken),
    GiveUp(ApiResponse),
}

impl ApiClient {
    /// Create a client with its own session-expired emitter.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Self::with_events(config, store, SessionEvents::new())
    }

    /// Create a client that broadcasts session expiry on `events`.
    pub fn with_events(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        events: SessionEvents,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                events,
                refresh: RefreshGate::default(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The emitter session-expired listeners are registered on.
    pub fn session_events(&self) -> &SessionEvents {
        &self.inner.events
    }

    /// Register a listener called when the session cannot be recovered.
    pub fn on_session_expired<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.events.subscribe(listener)
    }

    /// Whether a token refresh is currently in flight.
    pub fn refresh_state(&self) -> RefreshState {
        self.inner.refresh.state()
    }

    /// The stored session, if any.
    pub async fn current_session(&self) -> Result<Option<StoredSession>, Error> {
        Ok(self.inner.store.load().await?)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Issue one request to `endpoint` (a path under the base URL).
    ///
    /// Never fails: transport errors, malformed responses, and auth failures
    /// are all reported through the returned [`ApiResponse`].
    #[instrument(skip(self, options), fields(method = %options.method, skip_auth = options.skip_auth))]
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        let url = self.inner.config.base_url().endpoint_url(endpoint);
        let http = &self.inner.http;
        let build = |token: Option<&AccessToken>| -> Result<RequestBuilder, Error> {
            Ok(options.build(http, &url, token))
        };

        if options.skip_auth {
            debug!("Sending unauthenticated request");
            return match self.attempt(&build, None).await {
                Ok(response) => classify(response).await,
                Err(failure) => failure,
            };
        }

        self.send_authenticated(build).await
    }

    /// Upload a multipart form to `endpoint`. Always authenticated.
    #[instrument(skip(self, form), fields(parts = form.len()))]
    pub async fn upload_form_data(&self, endpoint: &str, form: UploadForm) -> ApiResponse {
        let url = self.inner.config.base_url().endpoint_url(endpoint);
        let http = &self.inner.http;
        let build = |token: Option<&AccessToken>| -> Result<RequestBuilder, Error> {
            let mut builder = http.post(&url).multipart(form.to_multipart()?);
            if let Some(token) = token {
                builder = builder.bearer_auth(token.as_str());
            }
            Ok(builder)
        };

        self.send_authenticated(build).await
    }

    pub async fn get(&self, endpoint: &str) -> ApiResponse {
        self.request(endpoint, RequestOptions::get()).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> ApiResponse {
        self.request(endpoint, RequestOptions::post(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> ApiResponse {
        self.request(endpoint, RequestOptions::put(body)).await
    }

    pub async fn patch(&self, endpoint: &str, body: Value) -> ApiResponse {
        self.request(endpoint, RequestOptions::patch(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.request(endpoint, RequestOptions::delete()).await
    }

    /// Attempt with the stored token; on 401 recover once and retry.
    async fn send_authenticated<B>(&self, build: B) -> ApiResponse
    where
        B: Fn(Option<&AccessToken>) -> Result<RequestBuilder, Error>,
    {
        let Some(token) = self.stored_access_token().await else {
            debug!("No stored access token; sign-in required");
            return ApiResponse::login_required(None);
        };

        let response = match self.attempt(&build, Some(&token)).await {
            Ok(response) => response,
            Err(failure) => return failure,
        };

        match response.status() {
            StatusCode::UNAUTHORIZED => {}
            StatusCode::FORBIDDEN => {
                debug!("Request forbidden; not attempting refresh");
                return classify(response).await;
            }
            _ => return classify(response).await,
        }

        info!("Access token rejected; recovering session");
        let retry_token = match self.recover(&token).await {
            Recovery::Retry(token) => token,
            Recovery::GiveUp(failure) => return failure,
        };

        debug!("Retrying request with refreshed token");
        match self.attempt(&build, Some(&retry_token)).await {
            Ok(response) => classify(response).await,
            Err(failure) => failure,
        }
    }

    async fn attempt<B>(
        &self,
        build: &B,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response, ApiResponse>
    where
        B: Fn(Option<&AccessToken>) -> Result<RequestBuilder, Error>,
    {
        let request = build(token).map_err(|e| ApiResponse::failure(e.to_string()))?;

        request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ApiResponse::failure(TransportError::from(e).to_string())
        })
    }

    /// Decide how to continue after `rejected` was answered with 401.
    ///
    /// The stored-token comparison happens inside the refresh gate, so a
    /// caller arriving after a refresh settled sees its result in the store
    /// instead of starting another one.
    async fn recover(&self, rejected: &AccessToken) -> Recovery {
        match self.refresh_single_flight(Some(rejected.clone())).await {
            RefreshOutcome::Refreshed(token) => Recovery::Retry(token),
            RefreshOutcome::Expired => Recovery::GiveUp(ApiResponse::session_expired()),
            RefreshOutcome::Unavailable(message) => {
                Recovery::GiveUp(ApiResponse::failure(message))
            }
        }
    }

    async fn stored_access_token(&self) -> Option<AccessToken> {
        match self.inner.store.load().await {
            Ok(session) => session.map(|s| s.access_token),
            Err(e) => {
                warn!(error = %e, "Failed to read credential store");
                None
            }
        }
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Refresh the access token now, joining any refresh already in flight.
    ///
    /// # Errors
    ///
    /// [`AuthError::SessionExpired`] if the session was rejected (tokens are
    /// cleared and listeners notified), [`AuthError::RefreshUnavailable`] if
    /// the refresh endpoint failed transiently.
    pub async fn refresh_session(&self) -> Result<AccessToken, Error> {
        match self.refresh_single_flight(None).await {
            RefreshOutcome::Refreshed(token) => Ok(token),
            RefreshOutcome::Expired => Err(AuthError::SessionExpired.into()),
            RefreshOutcome::Unavailable(message) => {
                Err(AuthError::RefreshUnavailable { message }.into())
            }
        }
    }

    /// `rejected` is the access token a 401 answered, if any. The first
    /// caller's value decides the run; joiners share its outcome.
    async fn refresh_single_flight(&self, rejected: Option<AccessToken>) -> RefreshOutcome {
        let inner = Arc::clone(&self.inner);
        self.inner
            .refresh
            .run(move || async move { inner.perform_refresh(rejected).await }.boxed())
            .await
    }

    /// Sign in with email and password and persist the issued session.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn sign_in(&self, credentials: Credentials) -> ApiResponse {
        let response = self
            .request(
                LOGIN,
                RequestOptions::post(credentials.login_body()).skip_auth(),
            )
            .await;
        if !response.success {
            return response;
        }

        let data = response.data.clone().unwrap_or(Value::Null);
        let session = match serde_json::from_value::<SessionData>(data) {
            Ok(data) => StoredSession::new(
                AccessToken::new(data.session.access_token),
                RefreshToken::new(data.session.refresh_token),
            )
            .with_user(data.user),
            Err(e) => {
                warn!(error = %e, "Sign-in response carried no session");
                return ApiResponse::failure(format!("Unexpected sign-in response: {e}"));
            }
        };

        if let Err(e) = self.inner.store.save(&session).await {
            warn!(error = %e, "Failed to persist session");
            return ApiResponse::failure(format!("Failed to store session: {e}"));
        }

        info!("Signed in");
        response
    }

    /// Revoke the session server-side (best effort) and clear local tokens.
    ///
    /// Does not refresh and does not notify session-expired listeners.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> ApiResponse {
        if let Some(token) = self.stored_access_token().await {
            let url = self.inner.config.base_url().endpoint_url(LOGOUT);
            let request = self
                .inner
                .http
                .post(&url)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .bearer_auth(token.as_str());

            match request.send().await {
                Ok(response) => {
                    let response = classify(response).await;
                    if !response.success {
                        warn!(message = ?response.message, "Server-side sign-out failed");
                    }
                }
                Err(e) => warn!(error = %e, "Server-side sign-out failed"),
            }
        }

        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear session");
            return ApiResponse::failure(format!("Failed to clear session: {e}"));
        }

        info!("Signed out");
        ApiResponse::ok(None, Some("Signed out".to_string()))
    }
}

impl ClientInner {
    /// One round-trip to the refresh endpoint. Runs inside the refresh gate.
    ///
    /// With a `rejected` token the store is consulted first: a different
    /// stored token means another caller already refreshed, and an empty
    /// store means the session was already cleared and announced.
    #[instrument(skip_all, fields(after_401 = rejected.is_some()))]
    async fn perform_refresh(&self, rejected: Option<AccessToken>) -> RefreshOutcome {
        let session = match self.store.load().await {
            Ok(Some(session)) => session,
            Ok(None) if rejected.is_some() => {
                debug!("Session already cleared");
                return RefreshOutcome::Expired;
            }
            Ok(None) => {
                info!("No refresh token stored");
                return self.expire().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read credential store");
                return self.expire().await;
            }
        };

        if let Some(rejected) = &rejected
            && session.access_token != *rejected
        {
            debug!("Stored token changed since the request was sent");
            return RefreshOutcome::Refreshed(session.access_token);
        }

        let url = self.config.base_url().endpoint_url(REFRESH);
        let body = RefreshRequest {
            refresh_token: session.refresh_token.as_str(),
        };

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh request failed");
                return self.expire().await;
            }
        };

        let status = response.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), "Refresh endpoint unavailable");
            return RefreshOutcome::Unavailable(format!(
                "Unable to refresh session (HTTP {})",
                status.as_u16()
            ));
        }
        if !status.is_success() {
            info!(status = status.as_u16(), "Refresh rejected");
            return self.expire().await;
        }

        let tokens = match response.json::<RefreshResponse>().await {
            Ok(body) => body.data.session,
            Err(e) => {
                warn!(error = %e, "Malformed refresh response");
                return self.expire().await;
            }
        };

        let access_token = AccessToken::new(tokens.access_token);
        let refresh_token = RefreshToken::new(tokens.refresh_token);
        let updated = session.rotate(access_token.clone(), refresh_token);
        if let Err(e) = self.store.save(&updated).await {
            warn!(error = %e, "Failed to persist refreshed tokens");
        }

        info!("Session refreshed");
        RefreshOutcome::Refreshed(access_token)
    }

    /// Clear tokens and broadcast expiry. Called once per failed refresh.
    async fn expire(&self) -> RefreshOutcome {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear expired session");
        }
        self.events.emit_session_expired();
        RefreshOutcome::Expired
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", self.inner.config.base_url())
            .field("refresh", &self.inner.refresh)
            .field("events", &self.inner.events)
            .finish()
    }
}
