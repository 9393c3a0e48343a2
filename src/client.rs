use crate::error::{ApiError, ApiResult};
use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.honeycomb.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TEAM_HEADER: &str = "X-Honeycomb-Team";
const UA: &str = concat!("hccli/", env!("CARGO_PKG_VERSION"));

/// How the credential is presented. The caller decides; nothing is inferred
/// from the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Classic configuration/ingest keys: `X-Honeycomb-Team: <key>`.
    Team,
    /// Management keys: `Authorization: Bearer <key>`.
    Bearer,
}

/// Everything needed to build an [`ApiClient`]. Constructed once per
/// invocation and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    api_key: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut parsed = Url::parse(&config.base_url).context("parsing base URL")?;
        // Url::join drops the last segment unless the base ends with '/'.
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(HeaderValue::from_static(UA))
            .timeout(config.timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            api_key: config.api_key.clone(),
        })
    }

    /// Performs exactly one request/response cycle.
    ///
    /// `body` is sent as-is with a JSON content type. On 2xx the raw response
    /// bytes are returned; on any other status the body is captured verbatim
    /// into [`ApiError::Api`].
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
        auth: AuthScheme,
    ) -> ApiResult<Vec<u8>> {
        let url = self.url(path)?;
        debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static(UA));

        request = match auth {
            AuthScheme::Team => request.header(TEAM_HEADER, &self.api_key),
            AuthScheme::Bearer => {
                request.header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            }
        };

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(_) => "(unreadable body)".to_string(),
            };
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(bytes.to_vec())
    }

    /// Serializes `body` (if any), sends it and decodes the JSON response.
    pub async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        auth: AuthScheme,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = body
            .map(|b| serde_json::to_vec(b).map_err(ApiError::Encode))
            .transpose()?;
        let bytes = self.execute(method, path, query, payload, auth).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// GET a collection. A `null` or empty body is an empty list, not an error.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let bytes = self
            .execute(Method::GET, path, query, None, AuthScheme::Team)
            .await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let items: Option<Vec<T>> = serde_json::from_slice(&bytes).map_err(ApiError::Decode)?;
        Ok(items.unwrap_or_default())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request_json::<(), T>(Method::GET, path, &[], None, AuthScheme::Team)
            .await
    }

    pub async fn get_with_auth<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: AuthScheme,
    ) -> ApiResult<T> {
        self.request_json::<(), T>(Method::GET, path, &[], None, auth)
            .await
    }

    pub async fn create<T>(&self, path: &str, body: &T) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.request_json(Method::POST, path, &[], Some(body), AuthScheme::Team)
            .await
    }

    pub async fn update<T>(&self, path: &str, body: &T) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.request_json(Method::PUT, path, &[], Some(body), AuthScheme::Team)
            .await
    }

    /// DELETE; the response body, if any, is ignored.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute(Method::DELETE, path, &[], None, AuthScheme::Team)
            .await
            .map(|_| ())
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let normalized = path.trim_start_matches('/');
        self.base_url
            .join(normalized)
            .map_err(|e| ApiError::validation(format!("invalid request path `{path}`: {e}")))
    }
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(&ClientConfig {
        api_key: "test-key".into(),
        base_url: base_url.into(),
        timeout: DEFAULT_TIMEOUT,
    })
    .unwrap()
}
