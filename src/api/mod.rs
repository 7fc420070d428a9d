use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::form::BatchPayload;
use crate::model::{Batch, WireBatch};

pub mod model;

pub use model::{LoginRequest, LoginResponse, RegisterRequest};

const DEFAULT_API_BASE: &str = "http://localhost:4000/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request interceptor that attaches `Authorization: Bearer <token>` to every
/// outgoing request while a credential is configured. Only the session
/// manager sets or clears it.
#[derive(Clone, Default)]
pub struct BearerAuth {
    token: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("configured", &self.is_set())
            .finish()
    }
}

impl BearerAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
    }

    pub(crate) fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn is_set(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn intercept(&self, request: RequestBuilder) -> RequestBuilder {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth: BearerAuth,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    async fn register(&self, request: &RegisterRequest) -> ApiResult<()>;
}

#[async_trait]
pub trait BatchApi: Send + Sync {
    async fn list_all(&self) -> ApiResult<Vec<Batch>>;

    async fn list_public(&self) -> ApiResult<Vec<Batch>>;

    async fn create(&self, payload: &BatchPayload) -> ApiResult<Batch>;

    /// Returns the record as stored by the backend after the update.
    async fn update(&self, id: &str, payload: &BatchPayload) -> ApiResult<Batch>;

    async fn delete(&self, id: &str) -> ApiResult<()>;
}

impl ApiClient {
    pub fn new(auth: BearerAuth) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_API_BASE).context("invalid default API URL")?;
        Self::with_base_url(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS), auth)
    }

    pub fn from_config(cfg: &Config, auth: BearerAuth) -> Result<Self> {
        let base_url = cfg.base_url()?;
        Self::with_base_url(base_url, Duration::from_secs(cfg.api.timeout_seconds), auth)
    }

    pub fn with_base_url(base_url: Url, timeout: Duration, auth: BearerAuth) -> Result<Self> {
        let http = Client::builder()
            .user_agent("fxstream-client/0.1")
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn auth(&self) -> &BearerAuth {
        &self.auth
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment.
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::precondition("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ApiResult<reqwest::Request> {
        let url = self.endpoint(segments)?;
        let mut builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(self.auth.intercept(builder).build()?)
    }

    /// Send the request and return the raw body of a 2xx response.
    async fn execute(&self, request: reqwest::Request) -> ApiResult<String> {
        debug!(
            method = %request.method(),
            url = %request.url(),
            authorized = request.headers().contains_key("Authorization"),
            "sending request"
        );
        let res = self.http.execute(request).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, body = %body, "backend rejected request");
            return Err(ApiError::Rejected { status, body });
        }
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "received response");
        Ok(body)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ApiResult<String> {
        let request = self.build_request(method, segments, body)?;
        self.execute(request).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ApiResult<T> {
        let text = self.send(method, segments, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest { email, password };
        self.send_json(Method::POST, &["auth", "login"], Some(&body))
            .await
    }

    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        self.send(Method::POST, &["auth", "register"], Some(request))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn list_all(&self) -> ApiResult<Vec<Batch>> {
        let text = self.send::<()>(Method::GET, &["batches"], None).await?;
        decode_batches(&text)
    }

    #[instrument(skip_all)]
    pub async fn list_public(&self) -> ApiResult<Vec<Batch>> {
        let text = self
            .send::<()>(Method::GET, &["public-batches"], None)
            .await?;
        decode_batches(&text)
    }

    #[instrument(skip_all)]
    pub async fn create(&self, payload: &BatchPayload) -> ApiResult<Batch> {
        let text = self.send(Method::POST, &["batches"], Some(payload)).await?;
        decode_batch(&text)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(&self, id: &str, payload: &BatchPayload) -> ApiResult<Batch> {
        let text = self
            .send(Method::PUT, &["batches", id], Some(payload))
            .await?;
        if !text.trim().is_empty() {
            return decode_batch(&text);
        }

        debug!("update acknowledged without a record; re-fetching");
        self.list_all()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::precondition(format!("batch {} not found after update", id)))
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.send::<()>(Method::DELETE, &["batches", id], None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        ApiClient::login(self, email, password).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        ApiClient::register(self, request).await
    }
}

#[async_trait]
impl BatchApi for ApiClient {
    async fn list_all(&self) -> ApiResult<Vec<Batch>> {
        ApiClient::list_all(self).await
    }

    async fn list_public(&self) -> ApiResult<Vec<Batch>> {
        ApiClient::list_public(self).await
    }

    async fn create(&self, payload: &BatchPayload) -> ApiResult<Batch> {
        ApiClient::create(self, payload).await
    }

    async fn update(&self, id: &str, payload: &BatchPayload) -> ApiResult<Batch> {
        ApiClient::update(self, id, payload).await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        ApiClient::delete(self, id).await
    }
}

/// Decode a backend batch collection, normalizing every record.
pub fn decode_batches(body: &str) -> ApiResult<Vec<Batch>> {
    let wire: Vec<WireBatch> = serde_json::from_str(body)?;
    Ok(wire.into_iter().map(WireBatch::normalize).collect())
}

pub fn decode_batch(body: &str) -> ApiResult<Batch> {
    let wire: WireBatch = serde_json::from_str(body)?;
    Ok(wire.normalize())
}
