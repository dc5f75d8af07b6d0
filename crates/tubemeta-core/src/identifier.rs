//! YouTube identifier extraction from media file names.
//!
//! Library items are expected to carry their YouTube id as the bracketed
//! final segment of the name, e.g. `My Video [dQw4w9WgXcQ].mp4`. The token
//! can name a video, a channel or a playlist; only channels are recognisable
//! from the token itself (`UC` prefix).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Any run of non-bracket characters enclosed in square brackets.
static BRACKETED_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").ok());

/// Channel ids start with this prefix.
const CHANNEL_PREFIX: &str = "UC";

/// Lexical class of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierClass {
    /// A channel id (`UC...`).
    Channel,
    /// A video or playlist id; the caller decides which.
    Other,
}

/// An opaque, non-empty YouTube identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a raw token. Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify this identifier.
    #[must_use]
    pub fn class(&self) -> IdentifierClass {
        classify(&self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the identifier enclosed by the last `[...]` pair in `name`.
///
/// Returns `None` when the name has no bracket pair or the bracketed token is
/// blank. Callers should skip remote resolution in that case.
///
/// ```
/// use tubemeta_core::identifier::extract_identifier;
///
/// let id = extract_identifier("My Video [dQw4w9WgXcQ].mp4").unwrap();
/// assert_eq!(id.as_str(), "dQw4w9WgXcQ");
/// assert!(extract_identifier("My Video.mp4").is_none());
/// ```
#[must_use]
pub fn extract_identifier(name: &str) -> Option<Identifier> {
    let re = BRACKETED_TOKEN.as_ref()?;
    re.captures_iter(name)
        .filter_map(|caps| caps.get(1))
        .last()
        .and_then(|m| Identifier::new(m.as_str()))
}

/// Classify a raw token: `Channel` iff it starts with `UC`.
#[must_use]
pub fn classify(id: &str) -> IdentifierClass {
    if id.starts_with(CHANNEL_PREFIX) {
        IdentifierClass::Channel
    } else {
        IdentifierClass::Other
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn extracted(name: &str) -> Option<String> {
        extract_identifier(name).map(|id| id.as_str().to_string())
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extracted("My Video [dQw4w9WgXcQ].mp4"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_without_extension() {
        assert_eq!(
            extracted("Some Channel [UCabc1234567]"),
            Some("UCabc1234567".to_string())
        );
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extracted("Season 1 [PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf]"),
            Some("PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf".to_string())
        );
    }

    #[test]
    fn test_extract_takes_last_bracket_pair() {
        assert_eq!(
            extracted("[1080p] Concert [live] [dQw4w9WgXcQ].mkv"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_no_brackets() {
        assert_eq!(extracted("My Video.mp4"), None);
        assert_eq!(extracted(""), None);
    }

    #[test]
    fn test_extract_unbalanced_brackets() {
        assert_eq!(extracted("My Video dQw4w9WgXcQ].mp4"), None);
        assert_eq!(extracted("My Video [dQw4w9WgXcQ.mp4"), None);
    }

    #[test]
    fn test_extract_blank_token() {
        assert_eq!(extracted("My Video [].mp4"), None);
        assert_eq!(extracted("My Video [   ].mp4"), None);
    }

    #[test]
    fn test_extract_loose_character_set() {
        assert_eq!(
            extracted("Clip [abc-_.+ 42].webm"),
            Some("abc-_.+ 42".to_string())
        );
    }

    #[test]
    fn test_classify_channel() {
        assert_eq!(classify("UCabc1234567"), IdentifierClass::Channel);
        assert_eq!(classify("UC"), IdentifierClass::Channel);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify("dQw4w9WgXcQ"), IdentifierClass::Other);
        assert_eq!(classify("PLrAXtmErZgOei"), IdentifierClass::Other);
        assert_eq!(classify("uCabc"), IdentifierClass::Other);
    }

    #[test]
    fn test_classify_short_input() {
        assert_eq!(classify(""), IdentifierClass::Other);
        assert_eq!(classify("U"), IdentifierClass::Other);
    }

    #[test]
    fn test_filename_scenarios() {
        let channel = extract_identifier("My Video [UCabc1234567].mp4").unwrap();
        assert_eq!(channel.class(), IdentifierClass::Channel);

        let video = extract_identifier("My Video [dQw4w9WgXcQ].mp4").unwrap();
        assert_eq!(video.class(), IdentifierClass::Other);
    }

    #[test]
    fn test_identifier_rejects_blank() {
        assert!(Identifier::new("").is_none());
        assert!(Identifier::new(" \t").is_none());
        assert_eq!(Identifier::new("abc").unwrap().to_string(), "abc");
    }
}
