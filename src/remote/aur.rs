//! AUR RPC interface implementation

use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::package::Version;
use crate::remote::lookup::RemoteLookup;

/// Default base URL for the AUR
pub const DEFAULT_BASE_URL: &str = "https://aur.archlinux.org";

/// Response from the AUR RPC `info` query
#[derive(Debug, Deserialize)]
struct AurResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<AurPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AurPackage {
    name: String,
    version: String,
}

/// Lookup implementation backed by the AUR RPC interface (v5)
pub struct AurClient {
    client: reqwest::Client,
    base_url: String,
}

impl AurClient {
    /// Creates a new AurClient with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("repodiff/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn info_url(&self, package_name: &str) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse_with_params(
            &format!("{}/rpc/", self.base_url),
            &[("v", "5"), ("type", "info"), ("arg[]", package_name)],
        )
        .map_err(|e| FetchError::InvalidResponse(format!("invalid AUR URL: {}", e)))
    }
}

impl Default for AurClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl RemoteLookup for AurClient {
    async fn lookup(&self, package_name: &str) -> Result<Option<Version>, FetchError> {
        let url = self.info_url(package_name)?;
        debug!("Fetching AUR package info: {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!("AUR returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: AurResponse = response.json().await.map_err(|e| {
            debug!("Failed to parse AUR response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        if body.kind == "error" {
            return Err(FetchError::InvalidResponse(
                body.error.unwrap_or_else(|| "unknown AUR error".to_string()),
            ));
        }

        let Some(package) = body.results.into_iter().find(|p| p.name == package_name) else {
            return Ok(None);
        };

        Version::parse(&package.version)
            .map(Some)
            .map_err(|e| FetchError::InvalidResponse(format!("{}: {}", package.version, e)))
    }
}
