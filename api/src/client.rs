use crate::wire::{CreatedEntry, EntriesResponse, ErrorBody, WireEntry, WireMeta};
use crate::{NewEntry, TournamentMeta};
use log::{debug, warn};
use pool_engine::Entry;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Local development server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Client for the pool service that owns entries and their brackets.
#[derive(Debug, Clone)]
pub struct PoolApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for PoolApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api {
        status: u16,
        detail: Option<String>,
        url: String,
    },
    Parsing(reqwest::Error, String),
    NotFound(String),
    Locked(String),
    Other(String),
}

impl ApiError {
    /// Transport failures and server-side errors are worth another try on the
    /// next refresh; client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(..) => true,
            ApiError::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api {
                status,
                detail: Some(detail),
                url,
            } => write!(f, "API error {status} for {url}: {detail}"),
            ApiError::Api { status, url, .. } => write!(f, "API error {status} for {url}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Locked(msg) => write!(f, "Locked: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl PoolApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("madpool/0.1 (bracket pool client)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every entry in the pool, in the order the service returns them.
    pub async fn fetch_entries(&self) -> ApiResult<Vec<Entry>> {
        let url = self.endpoint(&["entries"])?;
        let raw: EntriesResponse = self.get(url).await?;
        let entries = raw.into_entries();
        debug!("fetched {} entries", entries.len());
        Ok(entries)
    }

    pub async fn fetch_entry(&self, id: &str) -> ApiResult<Entry> {
        let url = self.endpoint(&["entries", id.trim()])?;
        let raw: WireEntry = self.get(url).await?;
        Ok(raw.into())
    }

    /// Register a new entry and return its id.
    pub async fn create_entry(&self, new: &NewEntry) -> ApiResult<String> {
        let url = self.endpoint(&["entries"])?;
        let request = self.client.post(url.clone()).json(new);
        let created: CreatedEntry = read_json(self.execute(request, &url).await?, &url).await?;
        let id = created.id.to_string();
        if id.is_empty() {
            return Err(ApiError::Other(format!("no entry id in response from {url}")));
        }
        Ok(id)
    }

    /// Replace the entry's saved bracket with its current pick map.
    ///
    /// A locked entry is refused without a round trip.
    pub async fn save_bracket(&self, entry: &Entry) -> ApiResult<()> {
        if entry.locked {
            return Err(ApiError::Locked(format!("entry {} is locked", entry.id)));
        }
        let url = self.endpoint(&["entries", entry.id.as_str(), "bracket"])?;
        let request = self.client.post(url.clone()).json(&entry.picks);
        self.execute(request, &url).await?;
        debug!("saved {} picks for entry {}", entry.picks.len(), entry.id);
        Ok(())
    }

    pub async fn fetch_meta(&self) -> ApiResult<TournamentMeta> {
        let url = self.endpoint(&["meta"])?;
        let raw: WireMeta = self.get(url).await?;
        Ok(raw.into())
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("base url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let request = self.client.get(url.clone());
        read_json(self.execute(request, &url).await?, &url).await
    }

    /// Send the request and turn any non-success status into an `ApiError`,
    /// carrying the body's `detail` when there is one.
    async fn execute(&self, request: RequestBuilder, url: &Url) -> ApiResult<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_detail);
        warn!("{status} from {url}: {}", detail.as_deref().unwrap_or("no detail"));

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(detail.unwrap_or_else(|| url.to_string())),
            StatusCode::FORBIDDEN | StatusCode::LOCKED => {
                ApiError::Locked(detail.unwrap_or_else(|| "entry is locked".into()))
            }
            _ => ApiError::Api {
                status: status.as_u16(),
                detail,
                url: url.to_string(),
            },
        })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response, url: &Url) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parsing(e, url.to_string()))
}
