//! Remote metadata fetching from the YouTube Data API.
//!
//! Every lookup is a single "list by id" call with the `snippet` projection.
//! A fixed courtesy delay precedes each call; both the delay and the request
//! give way to the caller's cancellation token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::error::{Error, Result, UpstreamError};
use crate::identifier::Identifier;
use crate::record::{CacheRecord, Channel, EntityKind, Playlist, Video};

/// Default API root.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default pause before every remote call.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(10);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a single remote record for an identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Look up `id` with the list operation selected by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when `cancel` fires first, or an
    /// [`Error::Upstream`] when the lookup fails or finds nothing.
    async fn fetch(
        &self,
        id: &Identifier,
        entity: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord>;
}

/// Body of a `*.list` response. Only the items matter.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// [`MetadataFetcher`] backed by the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YouTubeApiFetcher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    delay: Duration,
}

impl YouTubeApiFetcher {
    /// Create a fetcher with default base URL, delay and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::build(api_key.into(), DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a fetcher from resolver configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::build(config.api_key.clone(), config.request_timeout())?
            .with_base_url(config.api_base_url.clone())
            .with_delay(config.fetch_delay()))
    }

    fn build(api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::network_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            delay: DEFAULT_FETCH_DELAY,
        })
    }

    /// Point the fetcher at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the pause before every remote call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Pause applied before every remote call.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// URL of the list operation for `entity`, without query parameters.
    #[must_use]
    pub fn list_url(&self, entity: EntityKind) -> String {
        format!("{}/{}", self.base_url, entity.api_path())
    }

    async fn request(&self, id: &Identifier, entity: EntityKind) -> Result<CacheRecord> {
        let url = self.list_url(entity);
        debug!("Requesting {} {} from {}", entity, id, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("id", id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                Error::network_error(format!("Failed to query {url}: {}", e.without_url()))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(UpstreamError::Unauthorized {
                status: status.as_u16(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| {
                Error::invalid_response(format!(
                    "Failed to decode {entity} list: {}",
                    e.without_url()
                ))
            })?;

        first_record(id, entity, body)
    }
}

/// Take exactly the first item of a list response.
fn first_record(id: &Identifier, entity: EntityKind, body: ListResponse) -> Result<CacheRecord> {
    let item = body
        .items
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(id.as_str(), entity.to_string()))?;

    let record = match entity {
        EntityKind::Video => serde_json::from_value::<Video>(item).map(CacheRecord::Video),
        EntityKind::Channel => serde_json::from_value::<Channel>(item).map(CacheRecord::Channel),
        EntityKind::Playlist => {
            serde_json::from_value::<Playlist>(item).map(CacheRecord::Playlist)
        }
    };

    record.map_err(|e| Error::invalid_response(format!("Malformed {entity} {id}: {e}")))
}

#[async_trait]
impl MetadataFetcher for YouTubeApiFetcher {
    async fn fetch(
        &self,
        id: &Identifier,
        entity: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord> {
        if !self.delay.is_zero() {
            debug!("Waiting {:?} before fetching {}", self.delay, id);
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(self.delay) => {}
            }
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        info!("Downloading remote {} metadata for {}", entity, id);
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.request(id, entity) => result,
        }
    }
}
