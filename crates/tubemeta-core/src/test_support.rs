//! Record fixtures shared by unit tests.

use crate::record::{CacheRecord, Channel, Playlist, Snippet, Thumbnail, Thumbnails, Video};

pub fn sample_video(id: &str) -> CacheRecord {
    CacheRecord::Video(Video {
        id: id.to_string(),
        etag: Some("etag-video".to_string()),
        snippet: Snippet {
            published_at: Some("2009-10-25T06:57:33Z".to_string()),
            channel_id: Some("UCuAXFkgsw1L7xaCfnd5JJOw".to_string()),
            title: "Never Gonna Give You Up".to_string(),
            description: "The official video".to_string(),
            thumbnails: Thumbnails {
                default: Some(Thumbnail::with_url("https://i.ytimg.com/vi/x/default.jpg")),
                medium: Some(Thumbnail::with_url("https://i.ytimg.com/vi/x/mqdefault.jpg")),
                high: Some(Thumbnail::with_url("https://i.ytimg.com/vi/x/hqdefault.jpg")),
                standard: Some(Thumbnail::with_url("https://i.ytimg.com/vi/x/sddefault.jpg")),
                maxres: Some(Thumbnail::with_url(
                    "https://i.ytimg.com/vi/x/maxresdefault.jpg",
                )),
            },
            channel_title: Some("Rick Astley".to_string()),
            custom_url: None,
        },
    })
}

pub fn sample_channel(id: &str) -> CacheRecord {
    CacheRecord::Channel(Channel {
        id: id.to_string(),
        etag: None,
        snippet: Snippet {
            published_at: Some("2015-02-01T16:32:15Z".to_string()),
            title: "Rick Astley".to_string(),
            description: "Official channel".to_string(),
            thumbnails: Thumbnails {
                default: Some(Thumbnail::with_url("https://yt3.ggpht.com/c=s88")),
                medium: Some(Thumbnail::with_url("https://yt3.ggpht.com/c=s240")),
                high: Some(Thumbnail::with_url("https://yt3.ggpht.com/c=s800")),
                ..Thumbnails::default()
            },
            custom_url: Some("@rickastleyyt".to_string()),
            ..Snippet::default()
        },
    })
}

pub fn sample_playlist(id: &str) -> CacheRecord {
    CacheRecord::Playlist(Playlist {
        id: id.to_string(),
        etag: None,
        snippet: Snippet {
            published_at: Some("2020-03-14T09:26:53.589793Z".to_string()),
            channel_id: Some("UCowner".to_string()),
            title: "Season One".to_string(),
            description: "Every episode of season one".to_string(),
            thumbnails: Thumbnails {
                standard: Some(Thumbnail::with_url("https://i.ytimg.com/pl/sd.jpg")),
                medium: Some(Thumbnail::with_url("https://i.ytimg.com/pl/mq.jpg")),
                ..Thumbnails::default()
            },
            channel_title: Some("Owner Channel".to_string()),
            custom_url: None,
        },
    })
}
