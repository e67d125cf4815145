//! Mock language model for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::{CompletionRequest, LanguageModel, LlmError};

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// A language model that answers every request through a closure and keeps
/// a log of the requests it saw.
pub struct MockModel {
    responder: Responder,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl std::fmt::Debug for MockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockModel")
            .field("requests", &self.requests().len())
            .finish()
    }
}

impl MockModel {
    /// Answer with whatever `responder` returns for each request.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`.
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// Answer with the given results in order; once they run out every
    /// call fails with [`LlmError::EmptyResponse`].
    pub fn sequence(replies: Vec<Result<String, LlmError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_| {
            queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or(Err(LlmError::EmptyResponse))
        })
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Requests whose system prompt equals `system_prompt`.
    pub fn requests_for(&self, system_prompt: &str) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system_prompt() == Some(system_prompt))
            .collect()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }
        (self.responder)(request)
    }
}
