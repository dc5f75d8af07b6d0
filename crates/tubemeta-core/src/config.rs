//! Resolver configuration management.
//!
//! Handles loading, saving, and validating the settings the resolver needs:
//! the YouTube Data API key, the cache root, and the fetch timings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::DEFAULT_CACHE_TTL_SECS;
use crate::error::{Error, FileSystemError, Result};
use crate::fetcher::DEFAULT_API_BASE_URL;

/// Default pause before every remote call, in seconds.
pub const DEFAULT_FETCH_DELAY_SECS: u64 = 10;

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// YouTube Data API key.
    #[serde(default)]
    pub api_key: String,
    /// Root under which the `youtubemetadata` cache directory lives.
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,
    /// Pause before every remote call, in seconds.
    #[serde(default = "default_fetch_delay")]
    pub fetch_delay_secs: u64,
    /// Age after which a cached record is re-fetched, in seconds.
    #[serde(default = "default_ttl")]
    pub cache_ttl_secs: u64,
    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// API root URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

const fn default_fetch_delay() -> u64 {
    DEFAULT_FETCH_DELAY_SECS
}

const fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

const fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cache_root: default_cache_root(),
            fetch_delay_secs: DEFAULT_FETCH_DELAY_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_base_url: default_api_base_url(),
        }
    }
}

impl ResolverConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the cache root.
    #[must_use]
    pub fn with_cache_root(mut self, path: PathBuf) -> Self {
        self.cache_root = path;
        self
    }

    /// Set the pre-fetch delay.
    #[must_use]
    pub const fn with_fetch_delay_secs(mut self, secs: u64) -> Self {
        self.fetch_delay_secs = secs;
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Pre-fetch delay as a duration.
    #[must_use]
    pub const fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch_delay_secs)
    }

    /// Cache TTL as a duration.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check that the configuration can drive a resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, the cache root is relative,
    /// or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration(
                "YouTube API key is not set".to_string(),
            ));
        }

        if !self.cache_root.is_absolute() {
            return Err(Error::Configuration(format!(
                "Cache root must be an absolute path: {}",
                self.cache_root.display()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the default location, or create it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        if !config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", path.display());
        debug!("Cache root: {}", config.cache_root.display());

        Ok(config)
    }

    /// Save configuration to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create config directory: {e}"),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write config file: {e}"),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the path to the default config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Get the default cache root.
#[must_use]
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("tubemeta")
}

fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("tubemeta")
        .join("config.json")
}

/// Configuration manager that holds the loaded config and its origin.
pub struct ConfigManager {
    config: ResolverConfig,
    path: PathBuf,
}

impl ConfigManager {
    /// Load config from `path`, or from the default location when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self {
                config: ResolverConfig::load_from(&path)?,
                path,
            }),
            None => Ok(Self {
                config: ResolverConfig::load()?,
                path: config_file_path(),
            }),
        }
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Path the configuration was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace and persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved.
    pub fn update(&mut self, config: ResolverConfig) -> Result<()> {
        config.save_to(&self.path)?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.fetch_delay(), Duration::from_secs(10));
        assert_eq!(config.cache_ttl(), Duration::from_secs(10 * 24 * 60 * 60));
        assert_eq!(config.api_base_url, "https://www.googleapis.com/youtube/v3");
    }

    #[test]
    fn test_config_builder() {
        let config = ResolverConfig::new()
            .with_api_key("secret")
            .with_cache_root(PathBuf::from("/tmp/cache"))
            .with_fetch_delay_secs(0)
            .with_cache_ttl_secs(60);

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.cache_root, PathBuf::from("/tmp/cache"));
        assert_eq!(config.fetch_delay(), Duration::ZERO);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = ResolverConfig::new().with_cache_root(PathBuf::from("/tmp/cache"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_validate_requires_absolute_cache_root() {
        let config = ResolverConfig::new()
            .with_api_key("secret")
            .with_cache_root(PathBuf::from("relative/cache"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_validate_ok() {
        let config = ResolverConfig::new()
            .with_api_key("secret")
            .with_cache_root(PathBuf::from("/tmp/cache"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let json = r#"{"api_key":"secret","cache_root":"/var/cache/media"}"#;
        let config: ResolverConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.cache_root, PathBuf::from("/var/cache/media"));
        assert_eq!(config.fetch_delay_secs, DEFAULT_FETCH_DELAY_SECS);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("nested").join("config.json");
        let config = ResolverConfig::new()
            .with_api_key("secret")
            .with_cache_root(temp_dir.path().to_path_buf());

        config.save_to(&path).expect("Should save");
        let loaded = ResolverConfig::load_from(&path).expect("Should load");

        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_from_invalid_json() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = ResolverConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_config_manager_update() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        ResolverConfig::default().save_to(&path).unwrap();

        let mut manager = ConfigManager::open(Some(path.clone())).unwrap();
        assert!(manager.config().api_key.is_empty());

        manager
            .update(ResolverConfig::default().with_api_key("updated"))
            .unwrap();
        assert_eq!(manager.config().api_key, "updated");
        assert_eq!(ResolverConfig::load_from(&path).unwrap().api_key, "updated");
        assert_eq!(manager.path(), path.as_path());
    }

    #[test]
    fn test_default_cache_root() {
        let dir = default_cache_root();
        assert!(dir.to_string_lossy().contains("tubemeta"));
    }

    #[test]
    fn test_config_file_path_uses_correct_name() {
        let path = ResolverConfig::config_file_path();
        assert!(path.ends_with("tubemeta/config.json"));
    }
}
