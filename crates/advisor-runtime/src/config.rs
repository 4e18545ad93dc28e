//! Runtime Configuration
//!
//! Selects and builds the LLM backend from environment variables.

use std::sync::Arc;

use advisor_core::{AgentError, LlmProvider, ResilientProvider, Result, RetryPolicy};

#[cfg(feature = "groq")]
use crate::groq::{GroqConfig, GroqProvider};
#[cfg(feature = "ollama")]
use crate::ollama::{OllamaConfig, OllamaProvider};

/// Which LLM backend to use (`NLU_BACKEND`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Ollama,
    Groq,
}

impl Backend {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "groq" | "openai" => Ok(Self::Groq),
            other => Err(AgentError::Config(format!("unknown NLU_BACKEND '{other}'"))),
        }
    }

    /// Model used when `ADVISOR_MODEL` is unset
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::Groq => "llama-3.3-70b-versatile",
        }
    }
}

/// Everything needed to construct a provider
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub backend: Backend,
    pub model: String,
    pub retry: RetryPolicy,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = lookup("NLU_BACKEND")
            .map_or(Ok(Backend::Ollama), |v| Backend::parse(&v))?;
        let model = lookup("ADVISOR_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        let retry = RetryPolicy::from_lookup(&lookup);

        Ok(Self {
            backend,
            model,
            retry,
        })
    }

    /// Build the configured provider wrapped with timeout and retry handling
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        let inner: Arc<dyn LlmProvider> = match self.backend {
            #[cfg(feature = "ollama")]
            Backend::Ollama => Arc::new(OllamaProvider::from_config(OllamaConfig::from_env())),
            #[cfg(feature = "groq")]
            Backend::Groq => Arc::new(GroqProvider::from_config(GroqConfig::from_env()?)),
            #[allow(unreachable_patterns)]
            other => {
                return Err(AgentError::Config(format!(
                    "backend {other:?} is not compiled into this build"
                )));
            }
        };

        tracing::info!(
            provider = inner.name(),
            model = %self.model,
            timeout_secs = self.retry.timeout.as_secs(),
            max_retries = self.retry.max_retries,
            "LLM provider configured"
        );
        Ok(Arc::new(ResilientProvider::new(inner, self.retry.clone())))
    }
}
