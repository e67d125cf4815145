//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::{CompletionRequest, LanguageModel, LlmError};
use crate::utils::HttpClient;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for `POST {base_url}/chat/completions`.
///
/// The API key is handed in at construction; nothing is read from the
/// environment here.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = HttpClient::with_user_agent(&user_agent, timeout)
            .map_err(|e| LlmError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(body),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimit(retry_after),
                s if s.is_server_error() => LlmError::Server(format!("{}: {}", s, body)),
                s => LlmError::Api(format!("{}: {}", s, body)),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse completion: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(LlmError::EmptyResponse)
    }
}

// ===== OpenAI API Types =====

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use mockito::{Matcher, Server};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("Title:")],
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    fn client(base_url: &str, key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(base_url, key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 100
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": " A Study of Things \n"}},
                    {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
                ]
            }"#,
            )
            .create_async()
            .await;

        let answer = client(&server.url(), Some("sk-test"))
            .complete(&request())
            .await
            .unwrap();

        assert_eq!(answer, " A Study of Things \n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let result = client("http://127.0.0.1:9", None).complete(&request()).await;
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_blank_key_treated_as_missing() {
        let c = client("http://127.0.0.1:9", Some("   "));
        assert!(!c.has_api_key());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key"}}"#)
            .create_async()
            .await;

        let result = client(&server.url(), Some("sk-bad")).complete(&request()).await;
        assert!(matches!(result, Err(LlmError::Auth(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let result = client(&server.url(), Some("sk-test")).complete(&request()).await;
        assert!(matches!(result, Err(LlmError::RateLimit(Some(7)))));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let result = client(&server.url(), Some("sk-test")).complete(&request()).await;
        assert!(matches!(result, Err(LlmError::Server(_))));
    }

    #[tokio::test]
    async fn test_no_choices() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let result = client(&server.url(), Some("sk-test")).complete(&request()).await;
        assert!(matches!(result, Err(LlmError::EmptyResponse)));
    }
}
