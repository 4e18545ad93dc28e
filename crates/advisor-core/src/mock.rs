//! Scripted LLM Provider
//!
//! For testing and demo purposes. Replays queued completions in order and
//! records every prompt it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};

/// Provider that answers from a fixed script
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Default::default()
        }
    }

    /// Reply used once the script runs out (otherwise an error is returned)
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Queue a failing call
    pub fn push_error(&self, error: AgentError) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(error));
        }
    }

    /// User-message contents of every call so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of completed or failed calls
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == crate::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts
            .lock()
            .map_err(|e| AgentError::Other(e.to_string()))?
            .push(user);

        let next = self
            .replies
            .lock()
            .map_err(|e| AgentError::Other(e.to_string()))?
            .pop_front();

        match next {
            Some(reply) => reply.map(|content| Completion::text(content, options.model.clone())),
            None => self
                .fallback
                .clone()
                .map(|content| Completion::text(content, options.model.clone()))
                .ok_or_else(|| AgentError::ProviderUnavailable("script exhausted".into())),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
            context_length: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let provider = ScriptedProvider::new(["one", "two"]);
        let opts = GenerationOptions::default();

        assert_eq!(provider.prompt("sys", "a", &opts).await.unwrap(), "one");
        assert_eq!(provider.prompt("sys", "b", &opts).await.unwrap(), "two");
        assert!(provider.prompt("sys", "c", &opts).await.is_err());
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fallback_and_queued_error() {
        let provider = ScriptedProvider::new(Vec::<String>::new()).with_fallback("{}");
        provider.push_error(AgentError::Timeout(10));
        let opts = GenerationOptions::default();

        assert!(provider.prompt("sys", "x", &opts).await.is_err());
        assert_eq!(provider.prompt("sys", "y", &opts).await.unwrap(), "{}");
        assert_eq!(provider.calls(), 2);
    }
}
