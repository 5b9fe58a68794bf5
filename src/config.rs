//! Converter configuration loaded from `~/.config/docshift/config.toml`.
//!
//! ```toml
//! [fetch]
//! timeout_secs = 30
//! user_agent = "swiftpro-importer/1.0"
//!
//! [docx]
//! inline_images = false
//!
//! [pdf]
//! line_tolerance = 2.5
//! ```
//!
//! Every key is optional. A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConvertError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DOCSHIFT_CONFIG";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub docx: DocxOptions,
    pub pdf: PdfOptions,
}

/// HTTP settings for source fetching.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

/// DOCX → HTML options.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DocxOptions {
    /// Embed images as base64 `data:` URIs. When off, images are dropped.
    pub inline_images: bool,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            inline_images: true,
        }
    }
}

/// PDF line-grouping options.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PdfOptions {
    /// Maximum vertical distance (PDF user-space units) between two runs
    /// of the same visual line. Comparison is strict.
    pub line_tolerance: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&content)
    }

    /// Load from `DOCSHIFT_CONFIG` or the default location.
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV).map_or_else(config_path, PathBuf::from);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path).map_err(|e| match e {
            ConvertError::Io(io) => ConvertError::Io(std::io::Error::new(
                io.kind(),
                format!("failed to read {}: {io}", path.display()),
            )),
            other => other,
        })
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docshift")
        .join("config.toml")
}
