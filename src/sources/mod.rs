//! Bibliographic registry lookups.
//!
//! This module defines the [`TitleRegistry`] trait: given a DOI, return the
//! work's canonical title. [`CrossRefSource`] talks to the CrossRef REST API;
//! [`MockRegistry`] serves canned titles for tests.

mod crossref;
pub mod mock;

pub use crossref::{CrossRefSource, CROSSREF_API_BASE};
pub use mock::MockRegistry;

use async_trait::async_trait;

/// A registry that can resolve a DOI to the title it was registered with.
///
/// # Implementing a New Registry
///
/// 1. Create a struct that implements `TitleRegistry`
/// 2. Return [`SourceError::NotFound`] when the registry answers but has no
///    usable title; reserve the other variants for transport and format
///    problems
#[async_trait]
pub trait TitleRegistry: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this registry
    fn name(&self) -> &str;

    /// Canonical title registered for `doi`, trimmed
    async fn title_for_doi(&self, doi: &str) -> Result<String, SourceError>;
}

/// Errors that can occur when interacting with a registry
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// DOI unknown to the registry, or registered without a title
    #[error("Not found: {0}")]
    NotFound(String),

    /// API error from the registry
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
