//! # advisor-runtime
//!
//! Runtime LLM providers for the stock risk advisor.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference over the Ollama REST API
//! - **Groq**: hosted inference over the OpenAI-compatible chat API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use advisor_runtime::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env()?;
//! let provider = config.build_provider()?; // wrapped in ResilientProvider
//! ```

mod http;

pub mod config;

#[cfg(feature = "groq")]
pub mod groq;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use config::{Backend, RuntimeConfig};
#[cfg(feature = "groq")]
pub use groq::GroqProvider;
#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;

// Re-export core types for convenience
pub use advisor_core::{AgentError, LlmProvider, Message, Result, Role};
