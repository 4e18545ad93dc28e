//! Extraction Prompt
//!
//! Instruction sent to the model for every extraction. The model is asked
//! for one JSON object; anything else it produces is handled by the
//! normalizer.

use crate::slots::Intent;

/// System message for extraction calls
pub const EXTRACTION_SYSTEM: &str = "You are a JSON extraction assistant.";

const RULES: &str = r#"Rules, in priority order:

1. Commodities. If the question is about gold, silver, crude oil, oil,
   natural gas, copper or another traded commodity, the intent MUST be
   commodity_trend or commodity_news. Fill "commodity" and leave
   "stock_name" null.
   "Gold ka trend kya hai?" -> commodity_trend
   "Oil market news" -> commodity_news

2. stock_comparison: two or more companies joined by "vs", "or", "compare"
   or "which is better". Put every name in "stock_name" as a list.
   "TCS or Infosys" -> stock_comparison

3. stock_screener: asks to suggest or list stocks WITHOUT naming a company.
   "Suggest stocks for 10% return" -> stock_screener

4. portfolio_guidance: mentions an amount of money, names no company and
   asks where or how to invest. Put the amount in "capital" and the whole
   question in "query_text".
   "I have 5 lakh, where to invest?" -> portfolio_guidance

5. Single company questions:
   risk, safety or volatility -> risk_analysis ("Is TCS risky?")
   trend, movement or direction -> price_trend ("Infosys current trend")
   should I buy -> buy_decision
   should I sell or exit -> sell_decision
   news, updates or announcements -> stock_news
   rivals, peers or competitors -> competitor_analysis

6. Sectors: how a sector is doing -> sector_trend; stocks in a sector ->
   sector_screener. Fill "sector".

7. info_general: general how-to or definition questions about markets,
   brokers or accounts ("How to open a demat account?"). Put the whole
   question in "query_text".

Language: "hi" if the user writes in Hindi or Hinglish, otherwise "en".

Capital may be written as in the question ("5 lakh", "2 crore", "50000").
Use null for anything the user did not say. Do not guess company names."#;

const SCHEMA: &str = r#"{
  "intent": string,
  "stock_name": string | [string] | null,
  "commodity": string | null,
  "sector": string | null,
  "ticker": string | null,
  "capital": number | string | null,
  "target_return_pct": number | null,
  "investment_horizon": "short_term" | "medium_term" | "long_term" | null,
  "investor_type": "conservative" | "moderate" | "aggressive" | null,
  "risk_tolerance": "low" | "medium" | "high" | null,
  "action": "buy" | "sell" | "hold" | "unknown" | null,
  "language": "en" | "hi",
  "query_text": string | null
}"#;

/// Build the user message for one extraction over the cumulative `trace`
pub fn extraction_prompt(trace: &str) -> String {
    let intents = Intent::KNOWN
        .iter()
        .map(Intent::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Extract structured slots from the user's message. Do not answer it.\n\
         Reply with exactly one JSON object and nothing else: no markdown, \
         no comments.\n\n\
         Allowed intents: {intents}\n\n\
         {RULES}\n\n\
         Schema:\n{SCHEMA}\n\n\
         User message:\n\"\"\"{trace}\"\"\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_intent() {
        let prompt = extraction_prompt("Is TCS risky?");
        for intent in Intent::KNOWN {
            assert!(prompt.contains(intent.as_str()), "missing {intent}");
        }
    }

    #[test]
    fn test_prompt_embeds_trace() {
        let prompt = extraction_prompt("I have 5 lakh 5 lakh rupees");
        assert!(prompt.contains("\"\"\"I have 5 lakh 5 lakh rupees\"\"\""));
        assert!(prompt.contains("\"stock_name\""));
    }
}
