//! Metadata and image resolution for library items.
//!
//! A single [`MetadataResolver`] serves every item kind. The kind decides
//! which remote entity an identifier is looked up as and how many images are
//! offered; everything else (identifier extraction, caching, normalization)
//! is shared.
//!
//! Lookup failures never surface to the host: an item that cannot be
//! resolved simply yields an empty result. Cancellation is the exception and
//! is always returned as [`Error::Cancelled`].

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::MetadataCache;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierClass, extract_identifier};
use crate::normalize::{NormalizedMetadata, PROVIDER_ID_KEY, Person, normalize};
use crate::record::{CacheRecord, EntityKind};
use crate::thumbnail::{
    ImageType, RemoteImage, primary_thumbnail, select_thumbnails, to_remote_images,
};

/// Name the resolver reports to the host.
pub const PROVIDER_NAME: &str = "YouTube Metadata";

/// Position among the host's metadata providers.
pub const PROVIDER_ORDER: i32 = 1;

/// Kind of library item being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    /// A single video file.
    Video,
    /// A music video file.
    MusicVideo,
    /// A season folder backed by a playlist or channel.
    Season,
    /// A series folder backed by a playlist or channel.
    Series,
    /// A person credited on other items.
    Person,
}

impl ItemKind {
    /// All item kinds.
    pub const ALL: [Self; 5] = [
        Self::Video,
        Self::MusicVideo,
        Self::Season,
        Self::Series,
        Self::Person,
    ];

    /// Whether items of this kind group many videos.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Season | Self::Series)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::MusicVideo => "music-video",
            Self::Season => "season",
            Self::Series => "series",
            Self::Person => "person",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted || kind.as_str().replace('-', "") == wanted)
            .ok_or_else(|| Error::Configuration(format!("Unknown item kind: {s}")))
    }
}

impl EntityKind {
    /// Remote entity an item of `kind` is looked up as.
    #[must_use]
    pub const fn for_item(kind: ItemKind, class: IdentifierClass) -> Self {
        match kind {
            ItemKind::Video | ItemKind::MusicVideo => Self::Video,
            ItemKind::Season | ItemKind::Series => Self::for_collection(class),
            ItemKind::Person => Self::Channel,
        }
    }
}

/// What the host knows about an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Item kind.
    pub kind: ItemKind,
    /// Display name, usually the file or folder name.
    pub name: String,
    /// File or folder path, when known.
    pub path: Option<PathBuf>,
    /// Ids previously stored on the item, keyed by provider.
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,
}

impl ItemInfo {
    /// Describe an item by kind and display name.
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: None,
            provider_ids: HashMap::new(),
        }
    }

    /// Set the item's path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a provider id.
    #[must_use]
    pub fn with_provider_id(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.provider_ids.insert(key.into(), value.into());
        self
    }
}

/// Metadata handed back to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResult {
    /// Whether anything was found.
    pub has_metadata: bool,
    /// Normalized metadata.
    pub item: Option<NormalizedMetadata>,
    /// The item's name as the host knew it.
    pub original_title: Option<String>,
    /// People credited on the item.
    pub people: Vec<Person>,
}

impl MetadataResult {
    /// Result for an item nothing was found for.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Finds an item's path in the host library by its title.
#[cfg_attr(test, mockall::automock)]
pub trait ItemPathLookup: Send + Sync {
    /// Path of the library item titled `title`, if there is one.
    fn path_by_title(&self, title: &str) -> Option<PathBuf>;
}

/// Resolves metadata and images for library items through a shared cache.
pub struct MetadataResolver {
    cache: Arc<MetadataCache>,
    path_lookup: Option<Arc<dyn ItemPathLookup>>,
}

impl MetadataResolver {
    /// Create a resolver over `cache`.
    #[must_use]
    pub const fn new(cache: Arc<MetadataCache>) -> Self {
        Self {
            cache,
            path_lookup: None,
        }
    }

    /// Use `lookup` for items that arrive without a path.
    #[must_use]
    pub fn with_path_lookup(mut self, lookup: Arc<dyn ItemPathLookup>) -> Self {
        self.path_lookup = Some(lookup);
        self
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Image types offered for `kind`.
    #[must_use]
    pub fn supported_images(kind: ItemKind) -> Vec<ImageType> {
        if kind.is_collection() {
            vec![ImageType::Primary, ImageType::Disc]
        } else {
            vec![ImageType::Primary]
        }
    }

    /// Whether an identifier can be found for `item`.
    #[must_use]
    pub fn supports(&self, item: &ItemInfo) -> bool {
        self.identifier_for(item).is_some()
    }

    /// Identifier for `item`.
    ///
    /// People are identified by their stored channel id. Other items use the
    /// last component of their path (asking the path lookup when the item has
    /// none), then their name. Files drop their extension first; seasons and
    /// series are folders and keep the whole name.
    #[must_use]
    pub fn identifier_for(&self, item: &ItemInfo) -> Option<Identifier> {
        if item.kind == ItemKind::Person
            && let Some(id) = item
                .provider_ids
                .get(PROVIDER_ID_KEY)
                .and_then(|raw| Identifier::new(raw.trim()))
        {
            return Some(id);
        }

        let path = item.path.clone().or_else(|| {
            self.path_lookup
                .as_ref()
                .and_then(|lookup| lookup.path_by_title(&item.name))
        });

        let base_name: fn(&Path) -> Option<&OsStr> = if item.kind.is_collection() {
            Path::file_name
        } else {
            Path::file_stem
        };

        path.as_deref()
            .and_then(base_name)
            .and_then(|name| extract_identifier(&name.to_string_lossy()))
            .or_else(|| extract_identifier(&item.name))
    }

    /// Resolve metadata for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires. Every other failure is
    /// logged and reported as [`MetadataResult::empty`].
    pub async fn resolve_metadata(
        &self,
        item: &ItemInfo,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult> {
        let Some(record) = self.lookup(item, cancel).await? else {
            return Ok(MetadataResult::empty());
        };

        match normalize(&record) {
            Ok(metadata) => {
                debug!("Resolved {} {:?} as {}", item.kind, item.name, record.id());
                Ok(MetadataResult {
                    has_metadata: true,
                    original_title: Some(item.name.clone()),
                    people: vec![metadata.director.clone()],
                    item: Some(metadata),
                })
            }
            Err(e) => {
                warn!("Cannot normalize metadata for {:?}: {}", item.name, e);
                Ok(MetadataResult::empty())
            }
        }
    }

    /// Resolve images for `item`: every ranked thumbnail for seasons and
    /// series, at most one for everything else.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires. Every other failure is
    /// logged and reported as an empty list.
    pub async fn resolve_images(
        &self,
        item: &ItemInfo,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteImage>> {
        let Some(record) = self.lookup(item, cancel).await? else {
            return Ok(Vec::new());
        };

        let thumbnails = &record.snippet().thumbnails;
        let urls = if item.kind.is_collection() {
            select_thumbnails(thumbnails)
        } else {
            primary_thumbnail(thumbnails).into_iter().collect()
        };

        Ok(to_remote_images(PROVIDER_NAME, urls))
    }

    async fn lookup(
        &self,
        item: &ItemInfo,
        cancel: &CancellationToken,
    ) -> Result<Option<CacheRecord>> {
        let Some(id) = self.identifier_for(item) else {
            info!("YouTube ID not found for {} {:?}", item.kind, item.name);
            return Ok(None);
        };

        let entity = EntityKind::for_item(item.kind, id.class());
        match self.cache.ensure_fresh(&id, entity, cancel).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!("Lookup of {} {} failed: {}", entity, id, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::fetcher::MockMetadataFetcher;
    use crate::record::{Snippet, Video};
    use crate::test_support::{sample_channel, sample_playlist, sample_video};

    fn resolver(temp_dir: &TempDir, fetcher: MockMetadataFetcher) -> MetadataResolver {
        MetadataResolver::new(Arc::new(MetadataCache::new(
            temp_dir.path(),
            Arc::new(fetcher),
        )))
    }

    /// Fetcher answering every lookup with a fixture of the requested entity.
    fn answering_fetcher(times: usize) -> MockMetadataFetcher {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .times(times)
            .returning(|id, entity, _| {
                Ok(match entity {
                    EntityKind::Video => sample_video(id.as_str()),
                    EntityKind::Channel => sample_channel(id.as_str()),
                    EntityKind::Playlist => sample_playlist(id.as_str()),
                })
            });
        fetcher
    }

    #[test]
    fn test_entity_for_item() {
        use IdentifierClass::{Channel, Other};

        assert_eq!(EntityKind::for_item(ItemKind::Video, Channel), EntityKind::Video);
        assert_eq!(EntityKind::for_item(ItemKind::MusicVideo, Other), EntityKind::Video);
        assert_eq!(EntityKind::for_item(ItemKind::Season, Channel), EntityKind::Channel);
        assert_eq!(EntityKind::for_item(ItemKind::Season, Other), EntityKind::Playlist);
        assert_eq!(EntityKind::for_item(ItemKind::Series, Other), EntityKind::Playlist);
        assert_eq!(EntityKind::for_item(ItemKind::Person, Other), EntityKind::Channel);
    }

    #[test]
    fn test_item_kind_from_str() {
        assert_eq!("music-video".parse::<ItemKind>().unwrap(), ItemKind::MusicVideo);
        assert_eq!("MusicVideo".parse::<ItemKind>().unwrap(), ItemKind::MusicVideo);
        assert_eq!("SEASON".parse::<ItemKind>().unwrap(), ItemKind::Season);
        assert!("episode".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_supported_images() {
        assert_eq!(
            MetadataResolver::supported_images(ItemKind::Season),
            vec![ImageType::Primary, ImageType::Disc]
        );
        assert_eq!(
            MetadataResolver::supported_images(ItemKind::Video),
            vec![ImageType::Primary]
        );
    }

    #[test]
    fn test_identifier_sources() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir, MockMetadataFetcher::new());

        let from_path = ItemInfo::new(ItemKind::Video, "Display name")
            .with_path("/media/Rick Astley - Never [dQw4w9WgXcQ].mkv");
        assert_eq!(
            resolver.identifier_for(&from_path).unwrap().as_str(),
            "dQw4w9WgXcQ"
        );

        let from_name = ItemInfo::new(ItemKind::Series, "Some Channel [UCabc1234567]")
            .with_path("/media/no id here");
        assert_eq!(
            resolver.identifier_for(&from_name).unwrap().as_str(),
            "UCabc1234567"
        );

        let person = ItemInfo::new(ItemKind::Person, "Rick Astley")
            .with_provider_id(PROVIDER_ID_KEY, "UCuAXFkgsw1L7xaCfnd5JJOw");
        assert_eq!(
            resolver.identifier_for(&person).unwrap().as_str(),
            "UCuAXFkgsw1L7xaCfnd5JJOw"
        );

        assert!(!resolver.supports(&ItemInfo::new(ItemKind::Video, "Holiday 2019")));
    }

    #[test]
    fn test_path_lookup_used_when_path_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut lookup = MockItemPathLookup::new();
        lookup
            .expect_path_by_title()
            .times(1)
            .returning(|title| {
                (title == "My Show").then(|| PathBuf::from("/media/shows/My Show [PLshow123]"))
            });
        let resolver =
            resolver(&temp_dir, MockMetadataFetcher::new()).with_path_lookup(Arc::new(lookup));

        let id = resolver
            .identifier_for(&ItemInfo::new(ItemKind::Series, "My Show"))
            .unwrap();
        assert_eq!(id.as_str(), "PLshow123");
    }

    #[test]
    fn test_folder_identifier_keeps_dots() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir, MockMetadataFetcher::new());

        let series =
            ItemInfo::new(ItemKind::Series, "My Show").with_path("/media/My Show [PLab.cd]");
        assert_eq!(resolver.identifier_for(&series).unwrap().as_str(), "PLab.cd");

        let season =
            ItemInfo::new(ItemKind::Season, "Season 1").with_path("/media/My Show/Season [PLx.y]");
        assert_eq!(resolver.identifier_for(&season).unwrap().as_str(), "PLx.y");

        let video = ItemInfo::new(ItemKind::Video, "Clip").with_path("/media/Clip [abc.def].mp4");
        assert_eq!(resolver.identifier_for(&video).unwrap().as_str(), "abc.def");
    }

    #[tokio::test]
    async fn test_resolve_video_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir, answering_fetcher(1));
        let item = ItemInfo::new(ItemKind::Video, "Never Gonna [dQw4w9WgXcQ]");

        let result = resolver
            .resolve_metadata(&item, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.has_metadata);
        assert_eq!(result.original_title.as_deref(), Some("Never Gonna [dQw4w9WgXcQ]"));
        let metadata = result.item.unwrap();
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.production_year, 2009);
        assert_eq!(result.people, vec![metadata.director]);
    }

    #[tokio::test]
    async fn test_metadata_and_images_share_one_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir, answering_fetcher(1));
        let item = ItemInfo::new(ItemKind::Season, "Season One [PLseason1]");
        let cancel = CancellationToken::new();

        let result = resolver.resolve_metadata(&item, &cancel).await.unwrap();
        let images = resolver.resolve_images(&item, &cancel).await.unwrap();

        assert_eq!(result.item.unwrap().title, "Season One");
        let urls: Vec<_> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://i.ytimg.com/pl/sd.jpg", "https://i.ytimg.com/pl/mq.jpg"]
        );
    }

    #[tokio::test]
    async fn test_channel_backed_series_uses_channel_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, entity, _| *entity == EntityKind::Channel)
            .times(1)
            .returning(|id, _, _| Ok(sample_channel(id.as_str())));
        let resolver = resolver(&temp_dir, fetcher);
        let item = ItemInfo::new(ItemKind::Series, "Rick [UCuAXFkgsw1L7xaCfnd5JJOw]");

        let images = resolver
            .resolve_images(&item, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(images.len(), 3);
        assert_eq!(images[0].url, "https://yt3.ggpht.com/c=s800");
    }

    #[tokio::test]
    async fn test_single_items_get_one_image() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir, answering_fetcher(2));
        let cancel = CancellationToken::new();

        let video = ItemInfo::new(ItemKind::MusicVideo, "Song [dQw4w9WgXcQ]");
        let images = resolver.resolve_images(&video, &cancel).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://i.ytimg.com/vi/x/maxresdefault.jpg");
        assert_eq!(images[0].provider_name, PROVIDER_NAME);

        let person = ItemInfo::new(ItemKind::Person, "Rick Astley")
            .with_provider_id(PROVIDER_ID_KEY, "UCuAXFkgsw1L7xaCfnd5JJOw");
        let images = resolver.resolve_images(&person, &cancel).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://yt3.ggpht.com/c=s800");
    }

    #[tokio::test]
    async fn test_missing_identifier_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut fetcher = MockMetadataFetcher::new();
        fetcher.expect_fetch().times(0);
        let resolver = resolver(&temp_dir, fetcher);
        let item = ItemInfo::new(ItemKind::Video, "Holiday 2019");
        let cancel = CancellationToken::new();

        assert_eq!(
            resolver.resolve_metadata(&item, &cancel).await.unwrap(),
            MetadataResult::empty()
        );
        assert!(resolver.resolve_images(&item, &cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|id, entity, _| Err(Error::not_found(id.as_str(), entity.to_string())));
        let resolver = resolver(&temp_dir, fetcher);
        let item = ItemInfo::new(ItemKind::Video, "Gone [deleted1234]");
        let cancel = CancellationToken::new();

        let result = resolver.resolve_metadata(&item, &cancel).await.unwrap();
        assert!(!result.has_metadata);
        assert!(resolver.resolve_images(&item, &cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_record_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut fetcher = MockMetadataFetcher::new();
        fetcher.expect_fetch().times(1).returning(|id, _, _| {
            Ok(CacheRecord::Video(Video {
                id: id.as_str().to_string(),
                etag: None,
                snippet: Snippet {
                    published_at: Some("not a date".to_string()),
                    ..Snippet::default()
                },
            }))
        });
        let resolver = resolver(&temp_dir, fetcher);

        let result = resolver
            .resolve_metadata(
                &ItemInfo::new(ItemKind::Video, "Odd [oddvideo123]"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, MetadataResult::empty());
    }

    #[tokio::test]
    async fn test_cancellation_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let mut fetcher = MockMetadataFetcher::new();
        fetcher.expect_fetch().times(0);
        let resolver = resolver(&temp_dir, fetcher);
        let item = ItemInfo::new(ItemKind::Video, "Never Gonna [dQw4w9WgXcQ]");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver.resolve_metadata(&item, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        let err = resolver.resolve_images(&item, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
