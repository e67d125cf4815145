//! CrossRef registry implementation.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::{SourceError, TitleRegistry};
use crate::utils::HttpClient;

pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef registry
///
/// Uses the CrossRef REST API (`/works/{doi}`) for DOI metadata lookup.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CrossRefSource {
    /// Create a source against the public CrossRef API.
    ///
    /// `mailto` puts requests in CrossRef's "polite" pool.
    pub fn new(mailto: Option<&str>, timeout: Duration) -> Result<Self, SourceError> {
        Self::with_base_url(CROSSREF_API_BASE, mailto, timeout)
    }

    /// Create a source against an arbitrary base URL (mirrors, test servers).
    pub fn with_base_url(
        base_url: &str,
        mailto: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let user_agent = match mailto {
            Some(mailto) => format!(
                "{}/{} (mailto:{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                mailto
            ),
            None => format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        };

        Ok(Self {
            client: Arc::new(HttpClient::with_user_agent(&user_agent, timeout)?),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn works_url(&self, doi: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::InvalidRequest(format!("bad base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidRequest(format!("bad base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("works")
            .extend(doi.split('/'));

        Ok(url)
    }
}

#[async_trait]
impl TitleRegistry for CrossRefSource {
    fn name(&self) -> &str {
        "CrossRef"
    }

    async fn title_for_doi(&self, doi: &str) -> Result<String, SourceError> {
        let url = self.works_url(doi)?;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch DOI {}: {}", doi, e)))?;

        let status = response.status();
        tracing::info!("CrossRef response for DOI {}: {}", doi, status.as_u16());

        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND => SourceError::NotFound(format!("DOI {}", doi)),
                StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimit,
                _ => SourceError::Api(format!("CrossRef API returned status: {}", status)),
            });
        }

        let data: CRResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let title = data
            .message
            .title
            .first()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::NotFound(format!("no title registered for DOI {}", doi)))?;

        tracing::info!("Title from CrossRef: {}", title);
        Ok(title.to_string())
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRWork,
}

#[derive(Debug, Deserialize)]
struct CRWork {
    #[serde(default)]
    title: Vec<String>,
}
