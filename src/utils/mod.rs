//! Utility modules supporting the verification pipeline.
//!
//! - [`HttpClient`]: HTTP client with explicit timeouts
//! - [`DocumentReader`] / [`PdfReader`]: per-page PDF text extraction
//! - [`Document`]: an opened PDF and its leading pages
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use doi_verify::utils::{with_retry, RetryConfig};
//! use doi_verify::llm::LlmError;
//!
//! # async fn call_model() -> Result<String, LlmError> { Ok("10.1000/xyz".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), LlmError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let answer = with_retry(config, || call_model()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod pdf;
mod retry;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
pub use pdf::{Document, DocumentReader, PdfExtractError, PdfReader};
pub use retry::{with_retry, RetryConfig, Retryable, TransientError};
