//! Conversation Pipeline
//!
//! One user message in, one [`Reply`] out. The caller owns a
//! [`ConversationState`] per conversation and passes it back on every turn;
//! nothing is shared between conversations.

use std::sync::Arc;

use advisor_core::LlmProvider;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::advisor::AdvisorReasoner;
use crate::error::Result;
use crate::explain::{ExplanationSummary, describe, explain_result};
use crate::market::MarketDataProvider;
use crate::risk::RiskAssessment;
use crate::router::{IntentRouter, RouteContext};
use crate::slot_filler::{DEFAULT_MAX_FOLLOWUPS, FillOutcome, PendingFill, SlotFiller};
use crate::slots::SlotFrame;

const RESET_WORDS: &[&str] = &["reset", "exit", "quit", "clear"];

/// Per-conversation state carried between turns
#[derive(Clone, Debug, Default)]
pub struct ConversationState {
    pending: Option<PendingFill>,
}

impl ConversationState {
    /// Follow-up question currently awaiting an answer
    pub fn pending_question(&self) -> Option<&str> {
        self.pending.as_ref().map(PendingFill::question)
    }

    pub const fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Everything produced for a resolved request
#[derive(Clone, Debug, Serialize)]
pub struct AdvisorOutput {
    pub slots: SlotFrame,
    pub context: RouteContext,
    pub risk: Option<RiskAssessment>,
    /// Rule-based explanation
    pub explanation: String,
    pub summary: Option<ExplanationSummary>,
    /// Model-written narrative, or the explanation when the model failed
    pub advisor_text: String,
    /// Slots were resolved on a best-effort basis after the follow-up cap
    pub exhausted: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub enum Reply {
    FollowUp(String),
    Answer(Box<AdvisorOutput>),
    Error(String),
    Reset,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub model: String,
    pub max_followups: u32,
}

impl PipelineConfig {
    pub fn from_env(model: impl Into<String>) -> Self {
        Self::from_lookup(model, |key| std::env::var(key).ok())
    }

    /// Reads `MAX_FOLLOWUPS`; an unparsable value keeps the default
    pub fn from_lookup(model: impl Into<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            model: model.into(),
            max_followups: lookup("MAX_FOLLOWUPS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_FOLLOWUPS),
        }
    }
}

pub struct AdvisorPipeline {
    filler: SlotFiller,
    router: IntentRouter,
    reasoner: AdvisorReasoner,
    market: Arc<dyn MarketDataProvider>,
}

impl AdvisorPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        market: Arc<dyn MarketDataProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            filler: SlotFiller::new(provider.clone(), config.model.clone())
                .with_max_followups(config.max_followups),
            router: IntentRouter::new(market.clone()),
            reasoner: AdvisorReasoner::new(provider, config.model),
            market,
        }
    }

    pub const fn router(&self) -> &IntentRouter {
        &self.router
    }

    /// Advance a conversation by one user message
    pub async fn handle(&self, state: &mut ConversationState, message: &str) -> Reply {
        let message = message.trim();

        if RESET_WORDS.contains(&message.to_lowercase().as_str()) {
            state.clear();
            return Reply::Reset;
        }

        if message.is_empty() {
            return match state.pending_question() {
                Some(question) => Reply::FollowUp(question.to_string()),
                None => Reply::Error("Please type a question.".into()),
            };
        }

        let outcome = match state.pending.take() {
            Some(pending) => self.filler.resume(pending, message).await,
            None => self.filler.start(message).await,
        };

        let (frame, exhausted) = match outcome {
            FillOutcome::NeedsFollowUp { question, pending } => {
                state.pending = Some(pending);
                return Reply::FollowUp(question);
            }
            FillOutcome::Complete(frame) => (frame, false),
            FillOutcome::Exhausted(frame) => (frame, true),
        };

        info!(intent = frame.intent_label(), exhausted, "Slots resolved, routing");

        match self.answer(frame, exhausted).await {
            Ok(output) => Reply::Answer(Box::new(output)),
            Err(e) => {
                warn!(error = %e, "Routing failed");
                Reply::Error(e.user_message())
            }
        }
    }

    async fn answer(&self, frame: SlotFrame, exhausted: bool) -> Result<AdvisorOutput> {
        let context = self.router.route(&frame).await?;
        let source = self.market.name();

        let summary = match &context {
            RouteContext::SingleStock(stock) => {
                Some(explain_result(&stock.stock, &stock.risk, frame.language, source).summary)
            }
            _ => None,
        };
        let explanation = describe(&context, frame.language, source);
        let advisor_text = self.reasoner.narrate(&frame, &context, &explanation).await;

        Ok(AdvisorOutput {
            risk: context.risk().cloned(),
            slots: frame,
            context,
            explanation,
            summary,
            advisor_text,
            exhausted,
            generated_at: Utc::now(),
        })
    }
}
