use std::path::Path;
use std::time::Duration;

use dsr_types::ObjectLocator;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Environment variable overriding [`RepositoryConfig::base_url`].
pub const REPOSITORY_URL_ENV: &str = "DSR_REPOSITORY_URL";

/// Connection settings for a remote repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Scheme and authority, e.g. `http://localhost:8983`.
    pub base_url: String,
    /// Path under which objects live, e.g. `/fedora/rest/test`.
    pub base_path: String,
    /// Timeout for establishing a connection.
    pub connect_timeout_ms: u64,
    /// Timeout for reading or writing a single request.
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8983".into(),
            base_path: "/fedora/rest/test".into(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            user_agent: concat!("dsr/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl RepositoryConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Apply `DSR_REPOSITORY_URL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        let url = std::env::var(REPOSITORY_URL_ENV).ok();
        self.with_base_url_override(url)
    }

    fn with_base_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Repository root: base URL joined with the base path.
    pub fn root(&self) -> String {
        let url = self.base_url.trim_end_matches('/');
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            url.to_string()
        } else {
            format!("{url}/{path}")
        }
    }

    /// Locator of an object in this repository.
    pub fn object_locator(&self, object_id: &str) -> StoreResult<ObjectLocator> {
        Ok(ObjectLocator::new(self.root(), object_id)?)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reject settings no client could work with.
    pub fn validate(&self) -> StoreResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(StoreError::Config("timeouts must be > 0".into()));
        }
        Ok(())
    }
}
