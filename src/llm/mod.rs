//! Language model access.
//!
//! [`LanguageModel`] is the seam between the pipeline and a chat-completion
//! service. [`OpenAiClient`] speaks the OpenAI-compatible
//! `/chat/completions` protocol; [`MockModel`] answers from a closure in
//! tests. [`LlmTasks`] builds the three prompts the pipeline needs on top of
//! any model and wraps every call in the retry policy.

pub mod mock;
mod openai;
mod tasks;

pub use mock::MockModel;
pub use openai::{OpenAiClient, OPENAI_API_BASE};
pub use tasks::{
    LlmTasks, COMPARE_SYSTEM_PROMPT, DEFAULT_MODEL, DOI_SYSTEM_PROMPT, TITLE_SYSTEM_PROMPT,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::{Retryable, TransientError};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat completion request, serialized as-is for OpenAI-compatible APIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Content of the first system message, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Content of the last user message, if any
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A text-completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync + std::fmt::Debug {
    /// Run one completion and return the text of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Errors from a language model call
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured
    #[error("API key not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// Connection failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Rate limit exceeded, with the server's retry-after hint in seconds
    #[error("Rate limit exceeded")]
    RateLimit(Option<u64>),

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 5xx from the service
    #[error("Server error: {0}")]
    Server(String),

    /// Other non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Response body was not a completion
    #[error("Parse error: {0}")]
    Parse(String),

    /// Completion had no choices
    #[error("Completion returned no choices")]
    EmptyResponse,
}

impl Retryable for LlmError {
    fn transient(&self) -> Option<TransientError> {
        match self {
            LlmError::Network(_) => Some(TransientError::Network),
            LlmError::Timeout => Some(TransientError::Timeout),
            LlmError::RateLimit(retry_after) => Some(TransientError::RateLimit(*retry_after)),
            LlmError::Server(_) => Some(TransientError::ServerError),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
