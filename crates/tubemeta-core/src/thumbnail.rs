//! Thumbnail ranking and image download.
//!
//! Thumbnail tiers are ranked best first: maxres, standard, high, medium,
//! default. Collection items (seasons, series) expose every available tier;
//! single items expose only the best one.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{Thumbnail, Thumbnails};

/// Default timeout for image downloads.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Kind of artwork an image is offered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    /// Main poster or cover.
    Primary,
    /// Disc art.
    Disc,
}

/// An image offered to the host library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    /// Provider that supplied the image.
    pub provider_name: String,
    /// Image URL.
    pub url: String,
    /// Artwork kind.
    pub image_type: ImageType,
}

/// Tiers in rank order, skipping absent ones.
///
/// `default` counts only when it carries a non-empty URL; the other tiers
/// count as soon as the object is present.
fn ranked_tiers(thumbnails: &Thumbnails) -> impl Iterator<Item = &Thumbnail> {
    let default = thumbnails
        .default
        .as_ref()
        .filter(|t| t.url.as_deref().is_some_and(|url| !url.is_empty()));

    [
        thumbnails.maxres.as_ref(),
        thumbnails.standard.as_ref(),
        thumbnails.high.as_ref(),
        thumbnails.medium.as_ref(),
        default,
    ]
    .into_iter()
    .flatten()
}

fn non_blank(thumbnail: &Thumbnail) -> Option<String> {
    thumbnail
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// URLs of all available tiers, best first, with blank URLs dropped.
#[must_use]
pub fn select_thumbnails(thumbnails: &Thumbnails) -> Vec<String> {
    ranked_tiers(thumbnails).filter_map(non_blank).collect()
}

/// URL of the best available tier.
///
/// Only the first counted tier is considered: if it has a blank URL the
/// result is `None` even when a lower tier has one.
#[must_use]
pub fn primary_thumbnail(thumbnails: &Thumbnails) -> Option<String> {
    ranked_tiers(thumbnails).next().and_then(non_blank)
}

/// Tag each URL as a primary image from `provider_name`.
#[must_use]
pub fn to_remote_images<I>(provider_name: &str, urls: I) -> Vec<RemoteImage>
where
    I: IntoIterator<Item = String>,
{
    urls.into_iter()
        .map(|url| RemoteImage {
            provider_name: provider_name.to_string(),
            url,
            image_type: ImageType::Primary,
        })
        .collect()
}

/// Downloads image bytes for the host library.
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: reqwest::Client,
}

impl ImageClient {
    /// Create a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }

    /// Create a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::network_error(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download the image at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires first, or a network
    /// error if the request fails, returns a non-success status or an empty
    /// body.
    pub async fn fetch_image(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.download(url) => result,
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching image {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network_error(format!("Failed to fetch image: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network_error(format!(
                "Image request to {url} returned {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("image/") {
            warn!("Unexpected content type for image: {}", content_type);
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::network_error(format!("Failed to read image data: {e}")))?;

        if data.is_empty() {
            return Err(Error::network_error("Empty image data"));
        }

        Ok(data.to_vec())
    }
}
