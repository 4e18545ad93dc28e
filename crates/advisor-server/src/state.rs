//! Application State

use std::sync::Arc;

use advisor_core::{LlmProvider, MemorySessionStore};
use stock_advisor::{AdvisorPipeline, ConversationState};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Ollama, Groq), already wrapped with retries
    pub provider: Arc<dyn LlmProvider>,

    pub pipeline: Arc<AdvisorPipeline>,

    /// One conversation state per `conversation_id`
    pub sessions: Arc<MemorySessionStore<ConversationState>>,

    /// Model used for extraction and narrative
    pub model: String,
}
