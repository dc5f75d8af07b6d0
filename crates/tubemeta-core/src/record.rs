//! Remote resource records as returned by the YouTube Data API.
//!
//! Only the `snippet` projection is modelled. A [`CacheRecord`] is tagged by
//! the API's own `kind` field, so the JSON written to the cache is the same
//! shape as a single item of the API's list response.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::IdentifierClass;

/// The remote "list by id" operation to call for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// `videos.list`
    Video,
    /// `channels.list`
    Channel,
    /// `playlists.list`
    Playlist,
}

impl EntityKind {
    /// Path segment of the list operation under the API base URL.
    #[must_use]
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Channel => "channels",
            Self::Playlist => "playlists",
        }
    }

    /// Pick channel or playlist lookup for a collection-like item.
    #[must_use]
    pub const fn for_collection(class: IdentifierClass) -> Self {
        match class {
            IdentifierClass::Channel => Self::Channel,
            IdentifierClass::Other => Self::Playlist,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Channel => write!(f, "channel"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

/// A single thumbnail variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Thumbnail {
    /// Thumbnail with only a URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Thumbnail variants of a resource, keyed by resolution tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    /// 120x90 (videos) or 88x88 (channels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    /// 320x180.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    /// 480x360.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    /// 640x480.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<Thumbnail>,
    /// 1280x720.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

/// The `snippet` projection shared by videos, channels and playlists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Raw publish timestamp, usually RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Owning channel (videos and playlists).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Thumbnail variants.
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// Owning channel's title (videos and playlists).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    /// Channel handle (channels only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
}

/// A `youtube#video` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Video id.
    pub id: String,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Snippet projection.
    #[serde(default)]
    pub snippet: Snippet,
}

/// A `youtube#channel` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id.
    pub id: String,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Snippet projection.
    #[serde(default)]
    pub snippet: Snippet,
}

/// A `youtube#playlist` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist id.
    pub id: String,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Snippet projection.
    #[serde(default)]
    pub snippet: Snippet,
}

/// One cached remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CacheRecord {
    /// A video.
    #[serde(rename = "youtube#video")]
    Video(Video),
    /// A channel.
    #[serde(rename = "youtube#channel")]
    Channel(Channel),
    /// A playlist.
    #[serde(rename = "youtube#playlist")]
    Playlist(Playlist),
}

impl CacheRecord {
    /// Remote id of the resource.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Video(v) => &v.id,
            Self::Channel(c) => &c.id,
            Self::Playlist(p) => &p.id,
        }
    }

    /// Snippet projection.
    #[must_use]
    pub const fn snippet(&self) -> &Snippet {
        match self {
            Self::Video(v) => &v.snippet,
            Self::Channel(c) => &c.snippet,
            Self::Playlist(p) => &p.snippet,
        }
    }

    /// Which lookup produced this record.
    #[must_use]
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Video(_) => EntityKind::Video,
            Self::Channel(_) => EntityKind::Channel,
            Self::Playlist(_) => EntityKind::Playlist,
        }
    }

    /// Channel attributed to this record as `(title, channel id)`.
    ///
    /// Videos and playlists name their owning channel; a channel is its own
    /// owner.
    #[must_use]
    pub fn channel(&self) -> (&str, &str) {
        match self {
            Self::Channel(c) => (c.snippet.title.as_str(), c.id.as_str()),
            Self::Video(_) | Self::Playlist(_) => {
                let snippet = self.snippet();
                (
                    snippet.channel_title.as_deref().unwrap_or_default(),
                    snippet.channel_id.as_deref().unwrap_or_default(),
                )
            }
        }
    }
}
