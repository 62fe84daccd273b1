//! HTTP data source.
//!
//! Issues a GET against one backend endpoint per fetch.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{DataSource, FetchError, SourceKind};

/// A data source that fetches a surface's JSON over HTTP.
///
/// Sources can share one [`Client`] (and its connection pool) via
/// [`HttpSource::with_client`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    kind: SourceKind,
    client: Client,
    url: String,
    description: String,
}

impl HttpSource {
    /// Create a source with its own client and request timeout.
    pub fn new(kind: SourceKind, url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(kind, url, client))
    }

    /// Create a source that reuses an existing client.
    pub fn with_client(kind: SourceKind, url: impl Into<String>, client: Client) -> Self {
        let url = url.into();
        let description = format!("http: {}", url);
        Self {
            kind,
            client,
            url,
            description,
        }
    }

    /// Returns the URL being polled.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!("{} returned {}", self.url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Join a base URL and an absolute path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
