use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{LightflowError, Result};
use crate::models::{
    Asset, AssetPage, MaxFps, PerceptualOptionParams, PerceptualQualityParams, PlaybackInfo,
    WorkflowStorage, WorkflowStoragePage, WorkflowStorageResponse,
};

const BASE_URL_ENV: &str = "LIGHTFLOW_BASE_URL";
const TOKEN_ENV: &str = "LIGHTFLOW_API_TOKEN";

// Fixed H264 profile used by `create_basic_asset`.
const BASIC_MIN_BITRATE: u32 = 500;
const BASIC_MAX_RESOLUTION: u32 = 1080;
const BASIC_COMPLEXITY_PEAKS_AWARENESS: u32 = 1;

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use lightflow::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> lightflow::Result<()> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com/v1")
///     .token("my-token")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL every request path is appended to.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bearer token sent in the `Authorization` header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout. Without one, the transport defaults apply.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Build the [`Client`].
    ///
    /// Settings not given explicitly are read from the `LIGHTFLOW_BASE_URL`
    /// and `LIGHTFLOW_API_TOKEN` environment variables. A trailing `/` on the
    /// base URL is dropped.
    ///
    /// Returns [`LightflowError::Config`] if either value is still missing.
    pub fn build(self) -> Result<Client> {
        let base_url = resolve(self.base_url, BASE_URL_ENV, "base URL")?;
        let token = resolve(self.token, TOKEN_ENV, "API token")?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(LightflowError::Transport)?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Client::with_http_client(http, base_url, token))
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn resolve(explicit: Option<String>, env_key: &str, what: &str) -> Result<String> {
    explicit
        .or_else(|| std::env::var(env_key).ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LightflowError::Config {
            message: format!("{what} is required. Pass it to ClientBuilder or set {env_key}."),
        })
}

/// The Lightflow API client.
///
/// Every method is a single request/response exchange; nothing is cached and
/// nothing is retried. The client can be shared between tasks, and
/// [`set_token`](Self::set_token) may be called while other requests are in
/// flight.
///
/// # Example
///
/// ```no_run
/// use lightflow::Client;
///
/// # async fn example() -> lightflow::Result<()> {
/// let client = Client::new("https://api.example.com/v1", "my-token");
///
/// let asset = client.create_basic_asset("https://cdn.example.com/in.mp4", 4000, 80).await?;
/// println!("created {:?}", asset.uuid);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: String,
    token: RwLock<String>,
    http: reqwest::Client,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for `base_url` authenticating with `token`.
    ///
    /// No network activity happens here. Request paths are appended to
    /// `base_url` as given.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, token)
    }

    /// Create a client reusing an existing [`reqwest::Client`] and its
    /// connection pool.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: RwLock::new(token.into()),
            http,
        }
    }

    /// Base URL request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer token used by subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token.into();
    }

    /// Send a request and return the raw response.
    ///
    /// `path` is appended to the base URL verbatim. When `body` is present it
    /// is encoded as JSON before anything is sent. Every request carries
    /// `Content-Type: application/json` and the bearer token.
    ///
    /// # Errors
    ///
    /// - [`LightflowError::Serialization`] if `body` cannot be encoded.
    /// - [`LightflowError::Transport`] if the request cannot be completed.
    /// - [`LightflowError::ApiStatus`] if the status is 400 or above. The
    ///   error body is discarded.
    pub async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(LightflowError::Serialization)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.bearer()?);

        tracing::debug!(%method, %url, "sending request");

        let mut req = self.http.request(method.clone(), &url).headers(headers);
        if let Some(bytes) = payload {
            tracing::trace!(body = %String::from_utf8_lossy(&bytes), "request body");
            req = req.body(bytes);
        }

        let response = req.send().await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::warn!(%method, %url, status = status.as_u16(), "request failed");
            return Err(LightflowError::ApiStatus {
                status_code: status.as_u16(),
                status_text: status_text(status),
            });
        }

        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Workflow storages
    // -----------------------------------------------------------------------

    /// List workflow storages. Only the first page the server returns is fetched.
    pub async fn list_workflow_storages(&self) -> Result<WorkflowStoragePage> {
        let response = self
            .execute::<()>(Method::GET, "/inputs-outputs", None)
            .await?;
        decode("list workflow storages", StatusCode::OK, response).await
    }

    pub async fn create_workflow_storage(
        &self,
        storage: &WorkflowStorage,
    ) -> Result<WorkflowStorageResponse> {
        let response = self
            .execute(Method::POST, "/inputs-outputs", Some(storage))
            .await?;
        decode("create workflow storage", StatusCode::OK, response).await
    }

    /// Delete a workflow storage. `uuid` is placed in the path unescaped.
    pub async fn delete_workflow_storage(&self, uuid: &str) -> Result<()> {
        let response = self
            .execute::<()>(Method::DELETE, &format!("/inputs-outputs/{uuid}"), None)
            .await?;
        expect_status("delete workflow storage", StatusCode::NO_CONTENT, &response)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// List assets. Only the first page the server returns is fetched.
    pub async fn list_assets(&self) -> Result<AssetPage> {
        let response = self.execute::<()>(Method::GET, "/assets", None).await?;
        decode("list assets", StatusCode::OK, response).await
    }

    pub async fn get_asset(&self, uuid: &str) -> Result<Asset> {
        let response = self
            .execute::<()>(Method::GET, &format!("/assets/{uuid}"), None)
            .await?;
        decode("get asset", StatusCode::OK, response).await
    }

    /// Fetch manifests, renditions and DRM settings for a processed asset.
    pub async fn get_asset_playback(&self, uuid: &str) -> Result<PlaybackInfo> {
        let response = self
            .execute::<()>(Method::GET, &format!("/assets/{uuid}/playback"), None)
            .await?;
        decode("get asset playback info", StatusCode::OK, response).await
    }

    /// Submit an asset for processing and return the server's view of it.
    pub async fn create_asset(&self, asset: &Asset) -> Result<Asset> {
        let response = self.execute(Method::POST, "/assets", Some(asset)).await?;
        decode("create asset", StatusCode::OK, response).await
    }

    /// Submit `url` with an H264 perceptual-quality profile.
    ///
    /// Only the bitrate cap and target quality are configurable; the rest of
    /// the profile is fixed (min bitrate 500, max resolution 1080,
    /// complexity-peaks awareness on, automatic frame rate).
    pub async fn create_basic_asset(
        &self,
        url: impl Into<String>,
        max_bitrate: u32,
        target_quality: u32,
    ) -> Result<Asset> {
        let asset = Asset::new(url).with_perceptual_quality(PerceptualQualityParams::h264(
            PerceptualOptionParams {
                max_bitrate,
                min_bitrate: BASIC_MIN_BITRATE,
                max_resolution: BASIC_MAX_RESOLUTION,
                complexity_peaks_awareness: BASIC_COMPLEXITY_PEAKS_AWARENESS,
                max_fps: Some(MaxFps::Auto),
                target_quality,
            },
        ));
        self.create_asset(&asset).await
    }

    /// Delete an asset. `uuid` is placed in the path unescaped.
    pub async fn delete_asset(&self, uuid: &str) -> Result<()> {
        let response = self
            .execute::<()>(Method::DELETE, &format!("/assets/{uuid}"), None)
            .await?;
        expect_status("delete asset", StatusCode::NO_CONTENT, &response)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn bearer(&self) -> Result<HeaderValue> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

/// Fail with [`LightflowError::UnexpectedStatus`] unless the response carries
/// exactly `expected`.
fn expect_status(operation: &'static str, expected: StatusCode, response: &Response) -> Result<()> {
    let status = response.status();
    if status == expected {
        return Ok(());
    }

    tracing::warn!(
        operation,
        status = status.as_u16(),
        expected = expected.as_u16(),
        "unexpected response status"
    );
    Err(LightflowError::UnexpectedStatus {
        operation,
        status_code: status.as_u16(),
        status_text: status_text(status),
    })
}

/// Check the status, then read the whole body and decode it as `T`. The
/// response is consumed on every path.
async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    expected: StatusCode,
    response: Response,
) -> Result<T> {
    expect_status(operation, expected, &response)?;

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(operation, error = %e, "failed to decode response body");
        LightflowError::Decode(e)
    })
}
