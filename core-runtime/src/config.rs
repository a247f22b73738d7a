//! # Core Configuration Module
//!
//! Builder-pattern configuration for the mirror core. Enforces fail-fast
//! validation so a misconfigured host is rejected at startup rather than on
//! the first sync pass.
//!
//! ## Required Dependencies
//!
//! - `data_dir` - directory holding the cache files
//! - `developer_token` / `media_user_token` - remote library credentials
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest, behind the
//!   `desktop-shims` feature)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .data_dir("/path/to/data")
//!     .developer_token(dev_token)
//!     .media_user_token(user_token)
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::HttpClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Album cache file name inside `data_dir`
pub const ALBUM_CACHE_FILE: &str = "albums.json";

/// Play-count cache file name inside `data_dir`
pub const PLAY_COUNT_CACHE_FILE: &str = "play_counts.json";

/// Core configuration for the mirror engine.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory holding the persisted cache files
    pub data_dir: PathBuf,

    /// HTTP client for API requests
    pub http_client: Arc<dyn HttpClient>,

    /// Developer bearer token for the remote library API
    pub developer_token: String,

    /// Media user token identifying the library owner
    pub media_user_token: String,

    /// Catalog storefront for catalog track lookups
    pub storefront: String,

    /// Square pixel size at which artwork templates are rendered for export
    pub artwork_rendition_size: u32,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("http_client", &"HttpClient { ... }")
            .field("developer_token", &"<redacted>")
            .field("media_user_token", &"<redacted>")
            .field("storefront", &self.storefront)
            .field("artwork_rendition_size", &self.artwork_rendition_size)
            .finish()
    }
}

impl CoreConfig {
    /// Start building a configuration
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Full path of the album cache file
    pub fn album_cache_path(&self) -> PathBuf {
        self.data_dir.join(ALBUM_CACHE_FILE)
    }

    /// Full path of the play-count cache file
    pub fn play_count_cache_path(&self) -> PathBuf {
        self.data_dir.join(PLAY_COUNT_CACHE_FILE)
    }
}

/// Builder for [`CoreConfig`]
#[derive(Default)]
pub struct CoreConfigBuilder {
    data_dir: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    developer_token: Option<String>,
    media_user_token: Option<String>,
    storefront: Option<String>,
    artwork_rendition_size: Option<u32>,
}

impl CoreConfigBuilder {
    /// Directory holding the persisted cache files
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Custom HTTP client implementation
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Developer bearer token
    pub fn developer_token(mut self, token: impl Into<String>) -> Self {
        self.developer_token = Some(token.into());
        self
    }

    /// Media user token
    pub fn media_user_token(mut self, token: impl Into<String>) -> Self {
        self.media_user_token = Some(token.into());
        self
    }

    /// Catalog storefront (defaults to `us`)
    pub fn storefront(mut self, storefront: impl Into<String>) -> Self {
        self.storefront = Some(storefront.into());
        self
    }

    /// Artwork rendition size in pixels (defaults to 600)
    pub fn artwork_rendition_size(mut self, size: u32) -> Self {
        self.artwork_rendition_size = Some(size);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<CoreConfig> {
        let data_dir = self
            .data_dir
            .ok_or_else(|| Error::Config("data_dir is required".to_string()))?;

        let developer_token = self
            .developer_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config("developer_token is required".to_string()))?;

        let media_user_token = self
            .media_user_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config("media_user_token is required".to_string()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => Self::default_http_client()?,
        };

        Ok(CoreConfig {
            data_dir,
            http_client,
            developer_token,
            media_user_token,
            storefront: self.storefront.unwrap_or_else(|| "us".to_string()),
            artwork_rendition_size: self.artwork_rendition_size.unwrap_or(600),
        })
    }

    #[cfg(feature = "desktop-shims")]
    fn default_http_client() -> Result<Arc<dyn HttpClient>> {
        Ok(Arc::new(bridge_desktop::ReqwestHttpClient::new()))
    }

    #[cfg(not(feature = "desktop-shims"))]
    fn default_http_client() -> Result<Arc<dyn HttpClient>> {
        Err(Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client implementation provided. \
                      Desktop: enable the desktop-shims feature. \
                      Other hosts: inject a platform-native adapter."
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::http::{HttpRequest, HttpResponse};

    struct NoopHttpClient;

    #[async_trait]
    impl HttpClient for NoopHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> bridge_traits::error::Result<HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable("http".to_string()))
        }
    }

    #[test]
    fn test_build_with_explicit_client() {
        let config = CoreConfig::builder()
            .data_dir("/tmp/mirror")
            .developer_token("dev")
            .media_user_token("user")
            .http_client(Arc::new(NoopHttpClient))
            .build()
            .unwrap();

        assert_eq!(config.storefront, "us");
        assert_eq!(config.artwork_rendition_size, 600);
        assert_eq!(
            config.album_cache_path(),
            PathBuf::from("/tmp/mirror/albums.json")
        );
        assert_eq!(
            config.play_count_cache_path(),
            PathBuf::from("/tmp/mirror/play_counts.json")
        );
    }

    #[test]
    fn test_missing_data_dir_fails() {
        let result = CoreConfig::builder()
            .developer_token("dev")
            .media_user_token("user")
            .http_client(Arc::new(NoopHttpClient))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_token_fails() {
        let result = CoreConfig::builder()
            .data_dir("/tmp/mirror")
            .developer_token("")
            .media_user_token("user")
            .http_client(Arc::new(NoopHttpClient))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = CoreConfig::builder()
            .data_dir("/tmp/mirror")
            .developer_token("secret-dev")
            .media_user_token("secret-user")
            .http_client(Arc::new(NoopHttpClient))
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-dev"));
        assert!(!debug.contains("secret-user"));
    }
}
