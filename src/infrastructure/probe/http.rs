use std::time::Duration;

use async_trait::async_trait;
use derive_more::Display;
use reqwest::Client;
use tracing::debug;
use url::Url;

#[derive(Debug, Display)]
pub enum ProbeError {
    #[display("Invalid asset base URL: {_0}")]
    InvalidBaseUrl(String),

    #[display("Failed to build HTTP client: {_0}")]
    Client(String),
}

impl std::error::Error for ProbeError {}

/// Answers whether a static asset exists. Any failure counts as absent.
#[async_trait]
pub trait AssetProbe: Send + Sync {
    async fn exists(&self, path: &str) -> bool;
}

/// Issues `HEAD` requests against the static asset host.
#[derive(Clone)]
pub struct HttpAssetProbe {
    client: Client,
    base: Url,
}

impl HttpAssetProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let mut base = Url::parse(base_url).map_err(|_| ProbeError::InvalidBaseUrl(base_url.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(HttpAssetProbe { client, base })
    }

    /// Absolute URL of an asset path such as `/images/events/x/IMG_1001.jpg`.
    pub fn url_for(&self, path: &str) -> Option<Url> {
        self.base.join(path.trim_start_matches('/')).ok()
    }
}

#[async_trait]
impl AssetProbe for HttpAssetProbe {
    async fn exists(&self, path: &str) -> bool {
        let Some(url) = self.url_for(path) else {
            return false;
        };
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(path, error = %e, "Asset probe failed");
                false
            }
        }
    }
}
