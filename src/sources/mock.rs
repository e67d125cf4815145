//! Mock registry for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::sources::{SourceError, TitleRegistry};

/// A registry that answers from a fixed DOI → title table and records every
/// DOI it was asked about.
#[derive(Debug, Default)]
pub struct MockRegistry {
    titles: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl MockRegistry {
    /// Create an empty mock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `title` under `doi`.
    pub fn with_title(mut self, doi: &str, title: &str) -> Self {
        self.titles.insert(doi.to_string(), title.to_string());
        self
    }

    /// DOIs looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TitleRegistry for MockRegistry {
    fn name(&self) -> &str {
        "Mock Registry"
    }

    async fn title_for_doi(&self, doi: &str) -> Result<String, SourceError> {
        if let Ok(mut guard) = self.lookups.lock() {
            guard.push(doi.to_string());
        }

        self.titles
            .get(doi)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("DOI {}", doi)))
    }
}
