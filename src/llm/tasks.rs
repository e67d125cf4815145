//! The three questions the pipeline asks a language model.

use std::sync::Arc;

use crate::llm::{ChatMessage, CompletionRequest, LanguageModel};
use crate::text::truncate_chars;
use crate::utils::{with_retry, RetryConfig};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Characters of page text handed to the model per prompt.
pub const MAX_PROMPT_TEXT_CHARS: usize = 3000;

pub const DOI_SYSTEM_PROMPT: &str =
    "You are an assistant that extracts the DOI from provided text of a research paper.";

pub const TITLE_SYSTEM_PROMPT: &str =
    "You extract the title of research papers from provided text.";

pub const COMPARE_SYSTEM_PROMPT: &str = "You determine whether two titles refer to the same paper. \
     Do not be too strict: if the majority of the words match, the papers are a match. \
     Ignore a leading 'Supplementary material for'.";

/// Reply the model is told to give when the text holds no DOI.
const DOI_NOT_FOUND_REPLY: &str = "doi not found";

/// Prompt builders and answer parsers over a [`LanguageModel`].
#[derive(Debug, Clone)]
pub struct LlmTasks {
    model: Arc<dyn LanguageModel>,
    model_name: String,
    retry: RetryConfig,
}

impl LlmTasks {
    pub fn new(model: Arc<dyn LanguageModel>, model_name: &str, retry: RetryConfig) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            retry,
        }
    }

    /// Run a completion under the retry policy.
    ///
    /// Any failure that survives the retries is logged and becomes `None`.
    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Option<String> {
        let request = CompletionRequest {
            model: self.model_name.clone(),
            messages,
            max_tokens,
            temperature: 0.0,
        };

        let model = &self.model;
        let request = &request;
        match with_retry(self.retry, move || model.complete(request)).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("exception during API call: {}", e);
                None
            }
        }
    }

    /// Ask the model for the paper's DOI.
    ///
    /// `text` is normalized page text; it is cut to
    /// [`MAX_PROMPT_TEXT_CHARS`]. `None` when the model says the DOI is not
    /// present, answers with nothing, or the call fails.
    pub async fn extract_doi(&self, text: &str) -> Option<String> {
        let text = truncate_chars(text, MAX_PROMPT_TEXT_CHARS);
        let messages = vec![
            ChatMessage::system(DOI_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Extract and provide only the DOI of the research paper from the following text. \
                 If the DOI is not present, reply 'DOI not found'.\n\n{}\n\nDOI:",
                text
            )),
        ];

        let answer = self.complete(messages, 50).await?;
        let doi = answer.trim();
        tracing::info!("DOI from LLM: {}", doi);

        if doi.is_empty() || doi.to_lowercase().contains(DOI_NOT_FOUND_REPLY) {
            None
        } else {
            Some(doi.to_string())
        }
    }

    /// Ask the model for the paper's title from raw first-page text.
    pub async fn extract_title(&self, first_page: &str) -> Option<String> {
        let text = truncate_chars(first_page, MAX_PROMPT_TEXT_CHARS);
        let messages = vec![
            ChatMessage::system(TITLE_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Extract and provide only the title of the research paper from the following text:\
                 \n\n{}\n\nTitle:",
                text
            )),
        ];

        let answer = self.complete(messages, 100).await?;
        let title = answer.trim();
        tracing::info!("Title from LLM: {}", title);

        (!title.is_empty()).then(|| title.to_string())
    }

    /// Ask the model whether two titles name the same paper.
    ///
    /// True iff the answer contains "yes" in any case; a failed call counts
    /// as no.
    pub async fn titles_match(&self, registry_title: &str, derived_title: &str) -> bool {
        let messages = vec![
            ChatMessage::system(COMPARE_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Do the following two titles refer to the same research paper?\n\n\
                 Title 1: {}\nTitle 2: {}\n\nAnswer 'Yes' or 'No'.",
                registry_title, derived_title
            )),
        ];

        let Some(answer) = self.complete(messages, 5).await else {
            return false;
        };
        let answer = answer.trim().to_lowercase();
        tracing::info!("Title comparison result: {}", answer);

        answer.contains("yes")
    }
}
