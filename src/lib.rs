//! # doi-verify
//!
//! Identify a research paper's DOI from its PDF, confirm it against the
//! CrossRef registry and validate the match by comparing titles with a
//! language model.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`text`]: Page text normalization and DOI pattern extraction
//! - [`sources`]: Bibliographic registry lookups (CrossRef) behind the [`TitleRegistry`] trait
//! - [`llm`]: Language model client and the DOI/title/comparison tasks built on it
//! - [`pipeline`]: Per-file state machine and the run report
//! - [`models`]: Result records, statuses and the run summary
//! - [`utils`]: HTTP client, PDF reading and retry utilities
//! - [`config`]: Configuration management
//! - [`ui`]: Console output helpers

pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod text;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use llm::LanguageModel;
pub use models::{ResultRecord, RunSummary, Status};
pub use pipeline::Pipeline;
pub use sources::TitleRegistry;
