//! Authenticated HTTP client for the travel API.
//!
//! Every call goes through [`ApiClient::execute`], which attaches the session's access token and,
//! when the server answers 401, refreshes the token once and replays the request. Concurrent 401s
//! share a single refresh call.

use crate::api::schemas::auth::{Credentials, Profile, RefreshRequest, TokenPair, UpdateProfile};
use crate::telemetry::METER_NAME;
use opentelemetry::{KeyValue, global, metrics::Counter};
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub mod error;
pub mod navigation;
pub mod query;
pub mod retry;
pub mod session;
pub mod single_flight;

pub use error::{ClientError, ErrorKind};
pub use navigation::{LogNavigator, Navigator, WatchNavigator};
pub use query::QueryParams;
pub use retry::{RefreshOnUnauthorized, RequestMutation, RetryDecision, RetryPolicy};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use single_flight::SingleFlight;

const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Where the user is sent once the session cannot be recovered.
    pub login_path: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            login_path: "/login".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// One API call, kept replayable so it can be sent a second time after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: QueryParams,
    body: Option<serde_json::Value>,
    retried: bool,
    refreshable: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: QueryParams::new(), body: None, retried: false, refreshable: true }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// # Errors
    /// Returns `ClientError::InvalidRequest` if the body cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ClientError::InvalidRequest(e.to_string()))?);
        Ok(self)
    }

    /// Marks the request as one whose 401 means bad credentials rather than an expired token.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.refreshable = false;
        self
    }

    #[must_use]
    pub const fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }

    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    #[must_use]
    pub const fn is_refreshable(&self) -> bool {
        self.refreshable
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result of one shared refresh, handed to every request that waited on it.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Refreshed(String),
    NoRefreshToken,
    Failed(ClientError),
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
struct Metrics {
    token_refresh_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self {
            token_refresh_total: meter
                .u64_counter("client_token_refresh_total")
                .with_description("Token refresh attempts made by the API client")
                .build(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    config: ClientConfig,
    refresh_url: Url,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    policy: Arc<dyn RetryPolicy>,
    refresh_flight: SingleFlight<String, RefreshOutcome>,
    metrics: Metrics,
}

#[derive(Debug)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    policy: Arc<dyn RetryPolicy>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// # Errors
    /// Returns `ClientError::InvalidRequest` if the base URL is invalid or the HTTP client cannot be built.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let http = reqwest::Client::builder().timeout(self.config.timeout).build()?;
        let refresh_url = join_url(&self.config.base_url, REFRESH_PATH)?;

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                config: self.config,
                refresh_url,
                session: self.session,
                navigator: self.navigator,
                policy: self.policy,
                refresh_flight: SingleFlight::new(),
                metrics: Metrics::new(),
            }),
        })
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    #[must_use]
    pub fn builder(config: ClientConfig, session: Arc<dyn SessionStore>) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            session,
            navigator: Arc::new(LogNavigator),
            policy: Arc::new(RefreshOnUnauthorized),
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.session.session()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends `request` with the current access token, recovering once from an expired token.
    ///
    /// On a 401 the session's refresh token is exchanged for a new pair and the request is sent
    /// again with the new access token. If another request is already refreshing, this one waits
    /// for that refresh instead of starting its own. When the session cannot be recovered it is
    /// cleared and the navigator is sent to the login path.
    ///
    /// # Errors
    /// Returns the request's own failure, or the refresh failure when the refresh was rejected.
    pub async fn execute(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let mut request = request;
        let mut fresh_token: Option<String> = None;

        loop {
            let token = fresh_token.take().or_else(|| self.inner.session.session().access_token);
            let error = match self.send(&request, token.as_deref()).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if request.is_retried() {
                return Err(error);
            }

            match self.inner.policy.decide(&request, &error) {
                RetryDecision::Fail => return Err(error),
                RetryDecision::Retry { delay, mutation } => {
                    request = request.into_retry();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    if mutation == RequestMutation::RefreshAuthorization {
                        match self.refresh_access_token().await {
                            RefreshOutcome::Refreshed(token) => fresh_token = Some(token),
                            RefreshOutcome::NoRefreshToken => return Err(error),
                            RefreshOutcome::Failed(refresh_error) => return Err(refresh_error),
                        }
                    }
                }
            }
        }
    }

    /// # Errors
    /// See [`ApiClient::execute`]; also fails with `ClientError::Decode` on an unexpected body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryParams) -> Result<T, ClientError> {
        decode(self.execute(ApiRequest::get(path).with_query(query)).await?).await
    }

    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.execute(ApiRequest::post(path).with_json(body)?).await?).await
    }

    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.execute(ApiRequest::patch(path).with_json(body)?).await?).await
    }

    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        decode(self.execute(ApiRequest::delete(path)).await?).await
    }

    /// Logs in and stores the issued tokens and the user's profile.
    ///
    /// # Errors
    /// Returns the server's rejection, e.g. 401 for bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        self.authenticate("/auth/login", email, password).await
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    /// Returns the server's rejection, e.g. 409 for an email that is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        self.authenticate("/auth/register", email, password).await
    }

    async fn authenticate(&self, path: &str, email: &str, password: &str) -> Result<Profile, ClientError> {
        let credentials = Credentials { email: email.to_string(), password: password.to_string() };
        let request = ApiRequest::post(path).with_json(&credentials)?.anonymous();
        let tokens: TokenPair = decode(self.execute(request).await?).await?;

        self.inner.session.set_tokens(tokens);
        self.profile().await
    }

    /// Fetches the signed-in user's profile and caches it in the session.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let profile: Profile = self.get("/auth/profile", QueryParams::new()).await?;
        self.inner.session.set_user(profile.clone());
        Ok(profile)
    }

    /// Changes the signed-in user's email and stores the updated profile.
    ///
    /// # Errors
    /// See [`ApiClient::patch`]; a taken email surfaces as a 409.
    pub async fn update_profile(&self, email: &str) -> Result<Profile, ClientError> {
        let profile: Profile = self.patch("/users/me", &UpdateProfile { email: Some(email.to_string()) }).await?;
        self.inner.session.set_user(profile.clone());
        Ok(profile)
    }

    /// Revokes the session on the server and forgets it locally.
    ///
    /// An expired access token is refreshed first so the server can revoke. The local
    /// session is cleared even when the server call fails.
    pub async fn logout(&self) {
        if self.inner.session.session().is_authenticated() {
            match self.execute(ApiRequest::post("/auth/logout")).await {
                Ok(_) => tracing::debug!("Server session revoked"),
                Err(e) => tracing::warn!(error = %e, "Server logout failed, clearing local session anyway"),
            }
            // A failed refresh has already cleared the session and redirected.
            if !self.inner.session.session().is_authenticated() {
                return;
            }
        }
        self.inner.session.clear();
        self.inner.navigator.navigate(&self.inner.config.login_path);
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ClientError> {
        let mut url = join_url(&self.inner.config.base_url, &request.path)?;
        request.query.apply_to(&mut url);

        let mut builder = self.inner.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, path = %request.path, retried = request.retried, "API request");
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        tracing::debug!(method = %request.method, path = %request.path, status = %status.as_u16(), "API request failed");
        Err(ClientError::Status { status, message })
    }

    /// Joins the refresh already in flight or starts a new one.
    async fn refresh_access_token(&self) -> RefreshOutcome {
        let inner = &self.inner;
        let flight = inner.refresh_flight.join_or_start(inner.refresh_url.to_string(), || {
            // Read under the flight slot so the token cannot change between check and use.
            let refresh_token = inner.session.session().refresh_token;
            let http = inner.http.clone();
            let url = inner.refresh_url.clone();
            let session = Arc::clone(&inner.session);
            let navigator = Arc::clone(&inner.navigator);
            let login_path = inner.config.login_path.clone();
            let metrics = inner.metrics.clone();

            async move {
                let Some(refresh_token) = refresh_token else {
                    tracing::info!("No refresh token available, ending session");
                    metrics.token_refresh_total.add(1, &[KeyValue::new("status", "missing")]);
                    session.clear();
                    navigator.navigate(&login_path);
                    return RefreshOutcome::NoRefreshToken;
                };

                match request_refresh(&http, url, &refresh_token).await {
                    Ok(refreshed) => {
                        metrics.token_refresh_total.add(1, &[KeyValue::new("status", "success")]);
                        let access_token = refreshed.access_token.clone();
                        session.set_tokens(TokenPair {
                            access_token: refreshed.access_token,
                            refresh_token: refreshed.refresh_token.unwrap_or(refresh_token),
                        });
                        tracing::debug!("Access token refreshed");
                        RefreshOutcome::Refreshed(access_token)
                    }
                    Err(error) => {
                        metrics.token_refresh_total.add(1, &[KeyValue::new("status", "failure")]);
                        tracing::warn!(error = %error, "Token refresh failed, ending session");
                        session.clear();
                        navigator.navigate(&login_path);
                        RefreshOutcome::Failed(error)
                    }
                }
            }
        });

        flight.await
    }
}

/// Posts the refresh token directly, bypassing `execute` so a rejected refresh is never itself refreshed.
async fn request_refresh(
    http: &reqwest::Client,
    url: Url,
    refresh_token: &str,
) -> Result<RefreshResponse, ClientError> {
    let body = RefreshRequest { refresh_token: refresh_token.to_string() };
    let response = http.post(url).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response).await;
        return Err(ClientError::Status { status, message });
    }
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pulls the server's message out of an error body, falling back to the status reason.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let from_body = response.json::<serde_json::Value>().await.ok().and_then(|body| {
        ["error", "message"].iter().find_map(|field| body.get(field).and_then(|v| v.as_str()).map(str::to_string))
    });
    from_body.unwrap_or_else(|| status_reason(status))
}

fn status_reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn join_url(base: &str, path: &str) -> Result<Url, ClientError> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&joined).map_err(|e| ClientError::InvalidRequest(format!("{joined}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        let url = join_url("http://localhost:3000/api/", "/airports/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/airports/1");

        let url = join_url("http://localhost:3000/api", "auth/refresh").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/auth/refresh");

        assert!(matches!(join_url("not a url", "/x"), Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_flags() {
        let request = ApiRequest::get("/routes");
        assert!(request.is_refreshable());
        assert!(!request.is_retried());
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/routes");

        let request = request.anonymous().into_retry();
        assert!(!request.is_refreshable());
        assert!(request.is_retried());
    }
}
