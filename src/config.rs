//! Configuration: the optional TOML config file and resolved settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Catalog resource filename under the base URL.
pub const CATALOG_FILE: &str = "catalog.json";

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the catalog host.
    pub base_url: Url,
    /// Catalog resource location.
    pub catalog_url: Url,
    /// Root for primary sheet assets.
    pub sheets_root: Url,
    /// Root for solution assets.
    pub solutions_root: Url,
    /// Directory downloads are saved into.
    pub downloads_dir: PathBuf,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent override for HTTP requests.
    pub user_agent: Option<String>,
    /// Log file path.
    pub log_file: PathBuf,
}

impl Settings {
    /// Derive settings from a base URL, with platform-default directories.
    pub fn from_base(base_url: Url) -> Result<Self> {
        let base_url = ensure_trailing_slash(base_url);
        let catalog_url = base_url.join(CATALOG_FILE)?;
        let sheets_root = base_url.join("sheets/")?;
        let solutions_root = base_url.join("solutions/")?;

        let downloads_dir = dirs::download_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examshelf");
        let log_file = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examshelf")
            .join("shelf.log");

        Ok(Self {
            base_url,
            catalog_url,
            sheets_root,
            solutions_root,
            downloads_dir,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
            log_file,
        })
    }

    /// Ensure the downloads directory and the log file's parent exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.downloads_dir)?;
        if let Some(parent) = self.log_file.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

// `Url::join` treats the last path segment as a file unless it ends in '/'.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Configuration file structure (`examshelf.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the catalog host.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Override for the catalog resource URL.
    #[serde(default)]
    pub catalog_url: Option<String>,
    /// Downloads directory (supports `~`).
    #[serde(default)]
    pub downloads: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Log file path (supports `~`).
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from an explicit path or the discovered default.
    ///
    /// A missing discovered file is not an error; a missing or malformed
    /// explicit file is.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::discover_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("malformed config file {}", path.display()))
    }

    /// Default config file location in the platform config directory.
    pub fn discover_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("examshelf").join("examshelf.toml"))
    }

    /// Apply file values on top of derived settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref raw) = self.catalog_url {
            match Url::parse(raw) {
                Ok(url) => settings.catalog_url = url,
                Err(err) => tracing::warn!(%raw, %err, "ignoring invalid catalog_url in config"),
            }
        }
        if let Some(ref downloads) = self.downloads {
            let path = shellexpand::tilde(downloads);
            settings.downloads_dir = PathBuf::from(path.as_ref());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(ref log_file) = self.log_file {
            let path = shellexpand::tilde(log_file);
            settings.log_file = PathBuf::from(path.as_ref());
        }
    }
}
