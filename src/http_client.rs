//! Source fetching.
//!
//! A conversion source is either a remote `http(s)` URL or a local file
//! (`file://` URL or plain path). Remote sources go through a shared
//! `reqwest` client with compression and timeouts configured once;
//! local ones are read with `tokio::fs`.
//!
//! Failures are returned as-is. There is no retry and no cancellation:
//! a caller that needs either drops the future.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{ConvertError, Result};

/// Where a document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    /// Classify a locator string.
    ///
    /// `http`/`https` URLs are remote, `file://` URLs and anything that
    /// does not parse as a URL (including `C:\...` style paths) are local.
    pub fn parse(locator: &str) -> Self {
        match Url::parse(locator) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_or_else(|()| Self::Local(PathBuf::from(locator)), Self::Local),
            _ => Self::Local(PathBuf::from(locator)),
        }
    }

    /// Last path segment, used as the display name when none is given.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(|s| {
                    urlencoding::decode(s).map_or_else(|_| s.to_string(), |d| d.into_owned())
                }),
            Self::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }
}

/// HTTP client used for every remote fetch.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Create a client from the `[fetch]` config section.
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            // Let the server negotiate HTTP/2; plain HTTP/1.1 file hosts are common
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.clone());
        } else {
            builder = builder.user_agent(concat!("docshift/", env!("CARGO_PKG_VERSION")));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the raw bytes behind a locator.
    #[instrument(skip(self), fields(locator = %locator))]
    pub async fn fetch_bytes(&self, locator: &str) -> Result<Bytes> {
        match Source::parse(locator) {
            Source::Remote(url) => self.fetch_remote(url).await,
            Source::Local(path) => {
                debug!(path = %path.display(), "reading local file");
                Ok(Bytes::from(tokio::fs::read(&path).await?))
            }
        }
    }

    async fn fetch_remote(&self, url: Url) -> Result<Bytes> {
        debug!("fetching remote source");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        info!(
            status = %status,
            version = ?response.version(),
            content_type = ?response.headers().get("content-type"),
            "Response received"
        );

        if !status.is_success() {
            return Err(ConvertError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
