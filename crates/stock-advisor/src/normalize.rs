//! Structured-Extraction Normalizer
//!
//! Recovers a JSON object from free-form model output and coerces it into a
//! typed [`SlotFrame`]. Nothing here returns an error: unusable output is
//! `None`, unusable fields are absent.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::slots::{Intent, Language, SlotFrame, Subject};

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

// Word boundaries keep "l" in "loan" from reading as lakh
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(lakhs?|lacs?|crores?|cr|thousand|k|l)?\b").unwrap()
});

/// Extract the outermost JSON object from `raw`
///
/// Tries the text between the first `{` and the last `}` as-is, then once
/// more after swapping single quotes for double quotes and dropping
/// trailing commas.
pub fn normalize(raw: &str) -> Option<Map<String, Value>> {
    parse_object(outer_braces(raw)).or_else(|| {
        let repaired = repair(raw);
        parse_object(outer_braces(&repaired))
    })
}

fn outer_braces(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn repair(text: &str) -> String {
    let quoted = text.replace('\'', "\"");
    TRAILING_COMMA.replace_all(&quoted, "$1").into_owned()
}

/// Parse an Indian-style amount: "5 lakh", "2 crore", "50k", "₹ 1,00,000"
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let caps = AMOUNT_PATTERN.captures(text)?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    let base = Decimal::from_str(&digits).ok()?;

    let multiplier = match caps.get(2).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("lakh" | "lakhs" | "lac" | "lacs" | "l") => Decimal::from(100_000),
        Some("crore" | "crores" | "cr") => Decimal::from(10_000_000),
        Some("thousand" | "k") => Decimal::from(1_000),
        _ => Decimal::ONE,
    };

    let amount = base.checked_mul(multiplier)?;
    (amount > Decimal::ZERO).then_some(amount.normalize())
}

impl SlotFrame {
    /// Coerce a normalized extraction into typed slots
    ///
    /// Unknown keys are ignored, wrongly-typed values become absent, and a
    /// missing or unrecognized `language` falls back to `fallback_language`.
    pub fn from_extraction(
        map: &Map<String, Value>,
        trace: &str,
        fallback_language: Language,
    ) -> Self {
        let text = |key: &str| map.get(key).and_then(text_value);

        Self {
            intent: text("intent").map(|label| Intent::parse(&label)),
            subject: map
                .get("stock_name")
                .or_else(|| map.get("subject"))
                .map(subject_value)
                .unwrap_or_default(),
            commodity: text("commodity"),
            sector: text("sector"),
            ticker: text("ticker"),
            capital: map.get("capital").and_then(capital_value),
            target_return_pct: map.get("target_return_pct").and_then(number_value),
            investment_horizon: map.get("investment_horizon").and_then(enum_value),
            investor_type: map.get("investor_type").and_then(enum_value),
            risk_tolerance: map.get("risk_tolerance").and_then(enum_value),
            action: map.get("action").and_then(enum_value),
            language: text("language")
                .and_then(|code| Language::parse(&code))
                .unwrap_or(fallback_language),
            query_text: text("query_text"),
            trace: trace.to_string(),
        }
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let blank = s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none");
            (!blank).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn subject_value(value: &Value) -> Subject {
    match value {
        Value::Array(items) => Subject::from_names(items.iter().filter_map(text_value)),
        other => text_value(other).map_or(Subject::None, |name| Subject::from_names([name])),
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn capital_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .filter(|d| *d > Decimal::ZERO),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn enum_value<T: DeserializeOwned>(value: &Value) -> Option<T> {
    let label = text_value(value)?.to_lowercase().replace([' ', '-'], "_");
    serde_json::from_value(Value::String(label)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{InvestmentHorizon, InvestorType, TradeAction};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_embedded_json_matches_direct_parse() {
        let body = r#"{"intent": "risk_analysis", "stock_name": "TCS", "language": "en"}"#;
        let raw = format!("Sure! Here is the JSON:\n```json\n{body}\n```\nLet me know.");

        let direct: Value = serde_json::from_str(body).unwrap();
        let normalized = normalize(&raw).unwrap();
        assert_eq!(Value::Object(normalized), direct);
    }

    #[test]
    fn test_repairs_quotes_and_trailing_commas() {
        let raw = "{'intent': 'price_trend', 'stock_name': ['Infosys',], }";
        let map = normalize(raw).unwrap();
        assert_eq!(map["intent"], "price_trend");
        assert_eq!(map["stock_name"], json!(["Infosys"]));
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(normalize("I cannot help with that.").is_none());
        assert!(normalize("{not json at all}").is_none());
        assert!(normalize("[1, 2, 3]").is_none());
        assert!(normalize("").is_none());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("5 lakh"), Some(dec!(500000)));
        assert_eq!(parse_amount("2 crore"), Some(dec!(20000000)));
        assert_eq!(parse_amount("50k"), Some(dec!(50000)));
        assert_eq!(parse_amount("₹ 1,00,000"), Some(dec!(100000)));
        assert_eq!(parse_amount("1.5 lakhs"), Some(dec!(150000)));
        assert_eq!(parse_amount("Rs 25000"), Some(dec!(25000)));
        assert_eq!(parse_amount("no amount"), None);
        assert_eq!(parse_amount("0"), None);
    }

    #[test]
    fn test_parse_amount_overflow_is_absent() {
        assert_eq!(parse_amount("79228162514264337593543950335 crore"), None);
        assert_eq!(parse_amount("79228162514264337593543950335"), Some(Decimal::MAX));

        let map = normalize(r#"{"intent": "portfolio_guidance", "capital": "79228162514264337593543950335 lakh"}"#).unwrap();
        let frame = SlotFrame::from_extraction(&map, "", Language::En);
        assert_eq!(frame.capital, None);
    }

    #[test]
    fn test_coercion() {
        let map = normalize(
            r#"{
                "intent": "Portfolio Guidance",
                "stock_name": null,
                "commodity": "null",
                "capital": "5 lakh",
                "target_return_pct": "12%",
                "investment_horizon": "long term",
                "investor_type": "Conservative",
                "risk_tolerance": "extreme",
                "action": "hold",
                "language": "fr",
                "unexpected": 42
            }"#,
        )
        .unwrap();

        let frame = SlotFrame::from_extraction(&map, "I have 5 lakh", Language::Hi);
        assert_eq!(frame.intent, Some(Intent::PortfolioGuidance));
        assert_eq!(frame.subject, Subject::None);
        assert_eq!(frame.commodity, None);
        assert_eq!(frame.capital, Some(dec!(500000)));
        assert_eq!(frame.target_return_pct, Some(12.0));
        assert_eq!(frame.investment_horizon, Some(InvestmentHorizon::LongTerm));
        assert_eq!(frame.investor_type, Some(InvestorType::Conservative));
        assert_eq!(frame.risk_tolerance, None);
        assert_eq!(frame.action, Some(TradeAction::Hold));
        assert_eq!(frame.language, Language::Hi);
        assert_eq!(frame.trace(), "I have 5 lakh");
    }

    #[test]
    fn test_coercion_subject_shapes() {
        let list = json!({"stock_name": ["TCS", " ", "Infosys"], "capital": 250000});
        let frame = SlotFrame::from_extraction(list.as_object().unwrap(), "", Language::En);
        assert_eq!(
            frame.subject,
            Subject::Many(vec!["TCS".into(), "Infosys".into()])
        );
        assert_eq!(frame.capital, Some(dec!(250000)));

        let alias = json!({"subject": "Wipro", "language": "EN"});
        let frame = SlotFrame::from_extraction(alias.as_object().unwrap(), "", Language::Hi);
        assert_eq!(frame.subject, Subject::Single("Wipro".into()));
        assert_eq!(frame.language, Language::En);
    }
}
