//! Where model artifacts come from.

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Remote or local blob container holding the serialized artifacts
#[derive(Debug, Clone)]
pub enum BlobSource {
    /// A directory on the local filesystem
    Local { root: PathBuf },
    /// An HTTP blob endpoint, objects addressed as `{base_url}/{container}/{name}`
    Http {
        base_url: String,
        container: String,
        /// Query string appended to every request (shared access signature)
        token: Option<String>,
    },
}

impl BlobSource {
    /// Pick a source from a location string: `http(s)://` URLs are remote,
    /// anything else is a directory
    pub fn parse(location: &str, container: &str, token: Option<String>) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            BlobSource::Http {
                base_url: location.trim_end_matches('/').to_string(),
                container: container.to_string(),
                token,
            }
        } else {
            BlobSource::Local {
                root: PathBuf::from(location),
            }
        }
    }

    /// Where the blobs live, for logs
    pub fn location(&self) -> String {
        match self {
            BlobSource::Local { root } => root.display().to_string(),
            BlobSource::Http {
                base_url,
                container,
                ..
            } => format!("{}/{}", base_url, container),
        }
    }

    /// Address of a blob, for logs and error messages. Never includes the token.
    pub fn describe(&self, name: &str) -> String {
        match self {
            BlobSource::Local { root } => root.join(name).display().to_string(),
            BlobSource::Http {
                base_url,
                container,
                ..
            } => format!("{}/{}/{}", base_url, container, name),
        }
    }

    /// Download the full contents of a blob
    pub async fn fetch(&self, name: &str) -> Result<Bytes> {
        debug!("Fetching {}", self.describe(name));
        match self {
            BlobSource::Local { root } => {
                let path = root.join(name);
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(Bytes::from(data))
            }
            BlobSource::Http { token, .. } => {
                let mut url = self.describe(name);
                if let Some(token) = token {
                    url.push('?');
                    url.push_str(token.trim_start_matches('?'));
                }

                let client = reqwest::Client::builder()
                    .connect_timeout(CONNECT_TIMEOUT)
                    .timeout(REQUEST_TIMEOUT)
                    .build()
                    .map_err(|e| anyhow!("failed to build http client: {}", e.without_url()))?;
                // reqwest errors print the request url, token included
                let response = client.get(&url).send().await.map_err(|e| {
                    anyhow!("failed to download {}: {}", self.describe(name), e.without_url())
                })?;
                if !response.status().is_success() {
                    return Err(anyhow!(
                        "failed to download {}: HTTP {}",
                        self.describe(name),
                        response.status()
                    ));
                }

                response.bytes().await.map_err(|e| {
                    anyhow!("failed to read {}: {}", self.describe(name), e.without_url())
                })
            }
        }
    }
}
