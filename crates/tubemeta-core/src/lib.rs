//! `Tubemeta` Core Library
//!
//! Resolves YouTube metadata for media-library items whose file or folder
//! names embed a YouTube identifier in square brackets:
//! - Identifier extraction and classification (channel vs. other)
//! - A file-based record cache with a 10-day TTL
//! - Rate-limited, cancellable fetching from the YouTube Data API
//! - Normalization into library metadata and thumbnail ranking
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`]. See the [`error`] module for
//! the error taxonomy.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use tubemeta_core::{ItemInfo, ItemKind, MetadataCache, MetadataResolver, YouTubeApiFetcher};
//!
//! let fetcher = Arc::new(YouTubeApiFetcher::new("api-key")?);
//! let cache = Arc::new(MetadataCache::new("/var/cache/tubemeta", fetcher));
//! let resolver = MetadataResolver::new(cache);
//!
//! let item = ItemInfo::new(ItemKind::Video, "Never Gonna Give You Up [dQw4w9WgXcQ]");
//! let result = resolver.resolve_metadata(&item, &CancellationToken::new()).await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fs;
pub mod identifier;
pub mod normalize;
pub mod record;
pub mod resolver;
pub mod thumbnail;

#[cfg(test)]
mod test_support;

pub use cache::{
    CACHE_DIR_NAME, CacheStatus, DEFAULT_CACHE_TTL_SECS, MetadataCache, RECORD_FILE_NAME,
    is_fresh_at,
};
pub use config::{ConfigManager, ResolverConfig, default_cache_root};
pub use error::{
    CacheError, Error, ErrorContext, ErrorKind, FileSystemError, Result, UpstreamError,
};
pub use fetcher::{
    DEFAULT_API_BASE_URL, DEFAULT_FETCH_DELAY, DEFAULT_REQUEST_TIMEOUT, MetadataFetcher,
    YouTubeApiFetcher,
};
pub use fs::{FileSystem, RealFileSystem};
pub use identifier::{Identifier, IdentifierClass, classify, extract_identifier};
pub use normalize::{
    NormalizedMetadata, PROVIDER_ID_KEY, Person, PersonRole, create_person, normalize,
};
pub use record::{CacheRecord, Channel, EntityKind, Playlist, Snippet, Thumbnail, Thumbnails, Video};
pub use resolver::{
    ItemInfo, ItemKind, ItemPathLookup, MetadataResolver, MetadataResult, PROVIDER_NAME,
    PROVIDER_ORDER,
};
pub use thumbnail::{
    DEFAULT_FETCH_TIMEOUT_SECS, ImageClient, ImageType, RemoteImage, primary_thumbnail,
    select_thumbnails, to_remote_images,
};
