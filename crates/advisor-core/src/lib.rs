//! # advisor-core
//!
//! Provider-agnostic LLM abstraction shared by the stock risk advisor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SlotFiller / AdvisorReasoner   (stock-advisor)              │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ResilientProvider  ── timeout + backoff ──▶  LlmProvider    │
//! │                                               (Strategy)     │
//! │                                  Ollama │ Groq │ Scripted    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, Groq or a
//! scripted provider without changing extraction or advisor logic.

pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod retry;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use mock::ScriptedProvider;
pub use provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};
pub use retry::{MAX_BACKOFF, ResilientProvider, RetryPolicy};
pub use session::{MemorySessionStore, Session, SessionId, SessionStore, SharedSession};
