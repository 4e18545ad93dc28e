//! Slot-Filling Loop
//!
//! Extract → validate → ask one follow-up → merge the answer into the trace
//! → re-extract, until every mandatory field is present or the follow-up
//! cap is hit.
//!
//! ```text
//!            ┌──────────────┐
//!  query ──▶ │  Extracting  │ ◀──────────── answer (trace += " " + answer)
//!            └──────┬───────┘                       ▲
//!                   ▼                               │
//!            ┌──────────────┐   missing    ┌────────┴────────┐
//!            │  Validating  │ ───────────▶ │ AwaitingFollowUp│
//!            └──────┬───────┘              └────────┬────────┘
//!          complete │                  cap reached  │
//!                   ▼                               ▼
//!              Complete(frame)              Exhausted(frame)
//! ```
//!
//! The machine yields to the caller at every follow-up: `start` and
//! `resume` return a [`FillOutcome`], and the caller owns the
//! [`PendingFill`] in between.

use std::sync::Arc;

use advisor_core::LlmProvider;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::extractor::SlotExtractor;
use crate::followup::followup;
use crate::lang;
use crate::overrides;
use crate::slots::{Intent, Language, SlotFrame};

pub const DEFAULT_MAX_FOLLOWUPS: u32 = 5;

/// A request waiting for the user's answer to a follow-up question
#[derive(Clone, Debug)]
pub struct PendingFill {
    frame: SlotFrame,
    question: String,
    followups: u32,
    language_hint: Language,
}

impl PendingFill {
    /// The question the user is expected to answer
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Follow-up answers merged so far
    pub const fn followups(&self) -> u32 {
        self.followups
    }

    /// Slots extracted on the latest turn
    pub const fn frame(&self) -> &SlotFrame {
        &self.frame
    }

    /// Language detected from the first query
    pub const fn language_hint(&self) -> Language {
        self.language_hint
    }
}

#[derive(Clone, Debug)]
pub enum FillOutcome {
    /// Every mandatory field is present
    Complete(SlotFrame),

    /// One field is missing; ask `question` and resume with the answer
    NeedsFollowUp { question: String, pending: PendingFill },

    /// Follow-up cap reached; best-effort frame
    Exhausted(SlotFrame),
}

impl FillOutcome {
    /// The resolved frame, if the loop has terminated
    pub fn into_frame(self) -> Option<SlotFrame> {
        match self {
            Self::Complete(frame) | Self::Exhausted(frame) => Some(frame),
            Self::NeedsFollowUp { .. } => None,
        }
    }
}

/// Answers follow-up questions for blocking-style callers
#[async_trait]
pub trait FollowUpResponder: Send + Sync {
    /// The user's answer, or `None` if they gave up
    async fn answer(&self, question: &str) -> Option<String>;
}

pub struct SlotFiller {
    extractor: SlotExtractor,
    max_followups: u32,
}

impl SlotFiller {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            extractor: SlotExtractor::new(provider, model),
            max_followups: DEFAULT_MAX_FOLLOWUPS,
        }
    }

    #[must_use]
    pub const fn with_max_followups(mut self, max_followups: u32) -> Self {
        self.max_followups = max_followups;
        self
    }

    pub const fn max_followups(&self) -> u32 {
        self.max_followups
    }

    /// Begin filling slots for a new query
    pub async fn start(&self, query: &str) -> FillOutcome {
        let query = query.trim();
        let hint = lang::detect(query);
        info!(language = hint.as_str(), "Starting slot filling");

        let frame = self.extractor.extract(query, hint).await;
        self.evaluate(frame, 0, hint)
    }

    /// Merge the user's answer into the trace and re-extract
    pub async fn resume(&self, pending: PendingFill, answer: &str) -> FillOutcome {
        let followups = pending.followups.saturating_add(1);
        let trace = format!("{} {}", pending.frame.trace(), answer.trim());
        debug!(followups, trace = %trace, "Resuming slot filling");

        let frame = self.extractor.extract(&trace, pending.language_hint).await;
        self.evaluate(frame, followups, pending.language_hint)
    }

    /// Drive the loop to completion, asking `responder` for every follow-up
    ///
    /// Returns `Complete` or `Exhausted`; a responder that gives up ends the
    /// loop with the best-effort frame.
    pub async fn fill_interactive(&self, query: &str, responder: &dyn FollowUpResponder) -> FillOutcome {
        let mut outcome = self.start(query).await;

        loop {
            match outcome {
                FillOutcome::NeedsFollowUp { question, pending } => {
                    let Some(answer) = responder.answer(&question).await else {
                        info!("Follow-up abandoned, using best-effort slots");
                        return FillOutcome::Exhausted(best_effort(pending.frame));
                    };
                    outcome = self.resume(pending, &answer).await;
                }
                done => return done,
            }
        }
    }

    fn evaluate(&self, mut frame: SlotFrame, followups: u32, language_hint: Language) -> FillOutcome {
        overrides::apply(&mut frame);

        let Some(question) = followup(&frame) else {
            info!(intent = frame.intent_label(), followups, "Slots complete");
            return FillOutcome::Complete(frame);
        };

        if followups >= self.max_followups {
            info!(followups, "Follow-up limit reached");
            return FillOutcome::Exhausted(best_effort(frame));
        }

        FillOutcome::NeedsFollowUp {
            question: question.clone(),
            pending: PendingFill {
                frame,
                question,
                followups,
                language_hint,
            },
        }
    }
}

/// Default an unresolved intent to `risk_analysis` and re-apply overrides
fn best_effort(mut frame: SlotFrame) -> SlotFrame {
    if frame.intent.is_none() {
        frame.intent = Some(Intent::RiskAnalysis);
    }
    overrides::apply(&mut frame);
    frame
}
