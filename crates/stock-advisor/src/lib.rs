//! # stock-advisor
//!
//! Conversational risk advisor for Indian stocks, sectors and commodities.
//!
//! A free-text question is turned into typed slots by a language model,
//! missing slots are asked for one at a time, and the completed request is
//! routed to exactly one retrieval branch whose result is scored and
//! explained.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  "TCS vs Infosys, which is safer?"                           │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  SlotFiller ── extract ─ normalize ─ overrides ─ validate    │
//! │        │            ▲                             │          │
//! │        │            └──── follow-up answer ◀──────┘          │
//! │        ▼                                                     │
//! │  IntentRouter ──▶ MarketDataProvider (Strategy)              │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  risk score ─▶ explanation ─▶ advisor narrative + disclaimer │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stock_advisor::{AdvisorPipeline, ConversationState, MockMarketData, PipelineConfig, Reply};
//!
//! let pipeline = AdvisorPipeline::new(provider, Arc::new(MockMarketData::new()), PipelineConfig::from_env(model));
//! let mut state = ConversationState::default();
//! match pipeline.handle(&mut state, "Is TCS risky?").await {
//!     Reply::FollowUp(question) => println!("{question}"),
//!     Reply::Answer(output) => println!("{}", output.advisor_text),
//!     Reply::Error(message) => eprintln!("{message}"),
//!     Reply::Reset => {}
//! }
//! ```

pub mod error;
pub mod slots;
pub mod lang;
pub mod normalize;
pub mod validator;
pub mod followup;
pub mod commodity;
pub mod overrides;
pub mod prompts;
pub mod extractor;
pub mod slot_filler;
pub mod market;
pub mod portfolio;
pub mod risk;
pub mod explain;
pub mod router;
pub mod advisor;
pub mod pipeline;

pub use error::{AdvisorError, Result};
pub use slots::{Intent, Language, SlotField, SlotFrame, Subject};
pub use slot_filler::{FillOutcome, FollowUpResponder, PendingFill, SlotFiller};
pub use market::{MarketDataProvider, MockMarketData};
pub use risk::{RiskAssessment, RiskClass};
pub use router::{IntentRouter, RouteContext};
pub use explain::{DISCLAIMER, DISCLAIMER_HI};
pub use pipeline::{AdvisorOutput, AdvisorPipeline, ConversationState, PipelineConfig, Reply};
