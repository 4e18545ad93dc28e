//! Slot Extractor
//!
//! One extraction call: prompt, normalize, coerce. Never fails; a provider
//! error or unusable output yields the minimal default frame.

use std::sync::Arc;

use advisor_core::{GenerationOptions, LlmProvider};
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::prompts::{extraction_prompt, EXTRACTION_SYSTEM};
use crate::slots::{Language, SlotFrame};

pub struct SlotExtractor {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl SlotExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            options: GenerationOptions::extraction(model),
        }
    }

    /// Extract slots from the cumulative `trace`
    pub async fn extract(&self, trace: &str, fallback_language: Language) -> SlotFrame {
        let prompt = extraction_prompt(trace);

        let raw = match self.provider.prompt(EXTRACTION_SYSTEM, &prompt, &self.options).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Extraction call failed, using default frame");
                return SlotFrame::empty(trace, fallback_language);
            }
        };
        debug!(raw = %raw, "Extraction output");

        match normalize(&raw) {
            Some(map) => SlotFrame::from_extraction(&map, trace, fallback_language),
            None => {
                warn!("Extraction output is not a JSON object, using default frame");
                SlotFrame::empty(trace, fallback_language)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{Intent, Subject};
    use advisor_core::{AgentError, ScriptedProvider};

    #[tokio::test]
    async fn test_extracts_from_chatty_output() {
        let provider = Arc::new(ScriptedProvider::new([
            "Here you go: {\"intent\": \"risk_analysis\", \"stock_name\": \"TCS\", \"language\": \"en\"}",
        ]));
        let extractor = SlotExtractor::new(provider.clone(), "test");

        let frame = extractor.extract("Is TCS risky?", Language::En).await;
        assert_eq!(frame.intent, Some(Intent::RiskAnalysis));
        assert_eq!(frame.subject, Subject::Single("TCS".into()));
        assert_eq!(frame.trace(), "Is TCS risky?");
        assert!(provider.prompts()[0].contains("Is TCS risky?"));
    }

    #[tokio::test]
    async fn test_garbage_gives_default_frame() {
        let provider = Arc::new(ScriptedProvider::new(["Sorry, I can't do that."]));
        let extractor = SlotExtractor::new(provider, "test");

        let frame = extractor.extract("TCS ka risk kya hai?", Language::Hi).await;
        assert_eq!(frame, SlotFrame::empty("TCS ka risk kya hai?", Language::Hi));
    }

    #[tokio::test]
    async fn test_provider_error_gives_default_frame() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push_error(AgentError::Timeout(30));
        let extractor = SlotExtractor::new(provider, "test");

        let frame = extractor.extract("Is TCS risky?", Language::En).await;
        assert_eq!(frame.intent, None);
        assert_eq!(frame.language, Language::En);
    }
}
