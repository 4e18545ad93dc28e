//! Advisor Narrative
//!
//! Turns a routed context into a conversational answer via the language
//! model, under a fixed policy: no direct buy/sell advice, disclaimer last.

use std::sync::Arc;

use advisor_core::{GenerationOptions, LlmProvider};
use serde_json::{json, Value};
use tracing::warn;

use crate::explain::{disclaimer, ensure_disclaimer};
use crate::router::RouteContext;
use crate::slots::{Intent, Language, SlotFrame};

const SYSTEM: &str = "You are a careful financial market assistant for Indian investors.";

/// Extra instruction for intents that need a particular framing
pub const fn intent_guidance(intent: &Intent, language: Language) -> Option<&'static str> {
    match (intent, language) {
        (Intent::PriceTrend, Language::En) => Some(
            "The user wants the current trend. Say plainly whether it is upward, downward or \
             sideways and how strong the momentum is. Do not predict prices.",
        ),
        (Intent::PriceTrend, Language::Hi) => Some(
            "User ट्रेंड जानना चाहता है। साफ़ बताइए कि ट्रेंड ऊपर, नीचे या sideways है और \
             momentum कितना मज़बूत है। कीमत की भविष्यवाणी न करें।",
        ),
        (Intent::BuyDecision | Intent::SellDecision, Language::En) => Some(
            "The user is weighing a trade. Lay out the conditions under which it may or may \
             not make sense, balancing upside and risk, without telling them what to do.",
        ),
        (Intent::BuyDecision | Intent::SellDecision, Language::Hi) => Some(
            "User सौदे के बारे में सोच रहा है। संभावनाओं और जोखिमों को संतुलित रूप से \
             समझाइए। सीधे Buy/Sell न कहें।",
        ),
        (Intent::RiskAnalysis, Language::En) => {
            Some("The user wants to understand risk. Explain the main risk drivers in simple terms.")
        }
        (Intent::RiskAnalysis, Language::Hi) => {
            Some("User जोखिम समझना चाहता है। मुख्य जोखिम कारणों को आसान भाषा में समझाइए।")
        }
        (Intent::InfoGeneral, Language::En) => Some(
            "This is a general question about markets or investing. Answer it directly in \
             plain language; no market data is attached.",
        ),
        (Intent::InfoGeneral, Language::Hi) => Some(
            "यह बाज़ार या निवेश से जुड़ा सामान्य सवाल है। इसका सीधा और आसान जवाब दीजिए।",
        ),
        _ => None,
    }
}

/// Compact view of the context handed to the model
fn data_summary(context: &RouteContext) -> Value {
    match context {
        RouteContext::SingleStock(stock) => json!({
            "stock": stock.stock,
            "ticker": stock.ticker,
            "price_data": stock.price_data,
            "fundamentals": stock.fundamentals,
            "sentiment": stock.sentiment.score,
            "risk_score": stock.risk.risk_score,
            "classification": stock.risk.classification,
            "confidence": stock.risk.confidence,
        }),
        other => serde_json::to_value(other).unwrap_or(Value::Null),
    }
}

pub struct AdvisorReasoner {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl AdvisorReasoner {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            options: GenerationOptions::narrative(model),
        }
    }

    pub fn build_prompt(frame: &SlotFrame, context: &RouteContext) -> String {
        let language = frame.language;
        let guidance = frame
            .intent
            .as_ref()
            .and_then(|intent| intent_guidance(intent, language))
            .map(|g| format!("- {g}\n"))
            .unwrap_or_default();
        let data = serde_json::to_string_pretty(&data_summary(context)).unwrap_or_default();

        format!(
            "Reply in {language_name}, matching the user's tone.\n\n\
             The user asked:\n\"{query}\"\n\n\
             Your task:\n\
             - Answer what the user is actually trying to understand\n\
             - Be analytical but conversational\n\
             - NEVER give direct buy or sell advice\n\
             {guidance}\n\
             Structure:\n\
             1. One-line direct answer\n\
             2. What the data shows\n\
             3. Key risks or caveats\n\
             4. What to watch next\n\n\
             Data ({mode}):\n{data}\n\n\
             End with: {disclaimer}",
            language_name = language.display_name(),
            query = frame.trace(),
            mode = context.mode(),
            disclaimer = disclaimer(language),
        )
    }

    /// Narrative for a routed request; `fallback` is used if the model fails
    pub async fn narrate(&self, frame: &SlotFrame, context: &RouteContext, fallback: &str) -> String {
        let prompt = Self::build_prompt(frame, context);

        match self.provider.prompt(SYSTEM, &prompt, &self.options).await {
            Ok(text) if !text.trim().is_empty() => ensure_disclaimer(&text, frame.language),
            Ok(_) => {
                warn!("Advisor model returned an empty answer, using rule-based text");
                fallback.to_string()
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Advisor narrative failed, using rule-based text");
                fallback.to_string()
            }
        }
    }
}
