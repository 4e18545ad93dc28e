//! Slot Model
//!
//! Typed representation of one resolved user request. The model only ever
//! produces an untyped JSON object; `SlotFrame::from_extraction` (see
//! `normalize`) is the single place where that object becomes typed.
//! Monetary values use `rust_decimal`, never f64.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the user wants to know
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Intent {
    RiskAnalysis,
    BuyDecision,
    SellDecision,
    PriceTrend,
    StockScreener,
    StockComparison,
    StockNews,
    PortfolioGuidance,
    CompetitorAnalysis,
    SectorTrend,
    SectorScreener,
    CommodityTrend,
    CommodityNews,
    InfoGeneral,
    /// Any label outside the taxonomy, kept verbatim
    Other(String),
}

impl Intent {
    /// Every intent the extraction prompt offers
    pub const KNOWN: [Self; 14] = [
        Self::RiskAnalysis,
        Self::BuyDecision,
        Self::SellDecision,
        Self::PriceTrend,
        Self::StockScreener,
        Self::StockComparison,
        Self::StockNews,
        Self::PortfolioGuidance,
        Self::CompetitorAnalysis,
        Self::SectorTrend,
        Self::SectorScreener,
        Self::CommodityTrend,
        Self::CommodityNews,
        Self::InfoGeneral,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::RiskAnalysis => "risk_analysis",
            Self::BuyDecision => "buy_decision",
            Self::SellDecision => "sell_decision",
            Self::PriceTrend => "price_trend",
            Self::StockScreener => "stock_screener",
            Self::StockComparison => "stock_comparison",
            Self::StockNews => "stock_news",
            Self::PortfolioGuidance => "portfolio_guidance",
            Self::CompetitorAnalysis => "competitor_analysis",
            Self::SectorTrend => "sector_trend",
            Self::SectorScreener => "sector_screener",
            Self::CommodityTrend => "commodity_trend",
            Self::CommodityNews => "commodity_news",
            Self::InfoGeneral => "info_general",
            Self::Other(label) => label,
        }
    }

    /// Lenient parse: case, spaces and hyphens are normalized first
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        Self::KNOWN
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .unwrap_or(Self::Other(normalized))
    }

    /// Intents answered from equity data
    pub const fn is_equity(&self) -> bool {
        matches!(
            self,
            Self::RiskAnalysis
                | Self::BuyDecision
                | Self::SellDecision
                | Self::PriceTrend
                | Self::StockScreener
                | Self::StockComparison
                | Self::StockNews
                | Self::CompetitorAnalysis
        )
    }

    pub const fn is_commodity(&self) -> bool {
        matches!(self, Self::CommodityTrend | Self::CommodityNews)
    }
}

impl From<String> for Intent {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.as_str().to_string()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    /// Human-readable name, used inside prompts
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "hi" | "hindi" | "hinglish" => Some(Self::Hi),
            _ => None,
        }
    }
}

/// Entity name(s) a request is about
///
/// Serialized as `null`, a string, or an array of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    #[default]
    None,
    Single(String),
    Many(Vec<String>),
}

impl Subject {
    /// Build from a list of names; blanks are dropped
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        match names.len() {
            0 => Self::None,
            1 => Self::Single(names.remove(0)),
            _ => Self::Many(names),
        }
    }

    /// Non-blank names in order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Single(name) => vec![name.trim()],
            Self::Many(names) => names.iter().map(|n| n.trim()).collect(),
        }
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect()
    }

    /// First non-blank name
    pub fn primary(&self) -> Option<&str> {
        self.names().into_iter().next()
    }

    pub fn is_missing(&self) -> bool {
        self.primary().is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorType {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
    Unknown,
}

/// A field the validator can ask for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotField {
    Intent,
    Language,
    #[serde(rename = "stock_name")]
    Subject,
    Sector,
    Capital,
    Commodity,
    QueryText,
}

impl SlotField {
    /// Wire name of the field
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Language => "language",
            Self::Subject => "stock_name",
            Self::Sector => "sector",
            Self::Capital => "capital",
            Self::Commodity => "commodity",
            Self::QueryText => "query_text",
        }
    }

    /// Wording used in generic follow-up questions
    pub const fn label(self, language: Language) -> &'static str {
        match (language, self) {
            (Language::En, Self::Intent) => "type of analysis",
            (Language::En, Self::Language) => "preferred language",
            (Language::En, Self::Subject) => "stock name",
            (Language::En, Self::Sector) => "sector",
            (Language::En, Self::Capital) => "investment amount",
            (Language::En, Self::Commodity) => "commodity",
            (Language::En, Self::QueryText) => "question",
            (Language::Hi, Self::Intent) => "विश्लेषण का प्रकार",
            (Language::Hi, Self::Language) => "भाषा",
            (Language::Hi, Self::Subject) => "स्टॉक का नाम",
            (Language::Hi, Self::Sector) => "सेक्टर",
            (Language::Hi, Self::Capital) => "निवेश राशि",
            (Language::Hi, Self::Commodity) => "कमोडिटी",
            (Language::Hi, Self::QueryText) => "अपना सवाल",
        }
    }
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured slots for one request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotFrame {
    pub intent: Option<Intent>,

    /// Stock or company name(s)
    #[serde(rename = "stock_name", alias = "subject", default)]
    pub subject: Subject,

    pub commodity: Option<String>,
    pub sector: Option<String>,
    pub ticker: Option<String>,

    /// Capital to invest, in rupees
    pub capital: Option<Decimal>,

    pub target_return_pct: Option<f64>,
    pub investment_horizon: Option<InvestmentHorizon>,
    pub investor_type: Option<InvestorType>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub action: Option<TradeAction>,

    #[serde(default)]
    pub language: Language,

    pub query_text: Option<String>,

    /// Cumulative user text across follow-up turns
    #[serde(skip)]
    pub(crate) trace: String,
}

impl SlotFrame {
    /// Minimal frame used when extraction yields nothing usable
    pub fn empty(trace: impl Into<String>, language: Language) -> Self {
        Self {
            language,
            trace: trace.into(),
            ..Default::default()
        }
    }

    /// All user text seen so far for this request
    pub fn trace(&self) -> &str {
        &self.trace
    }

    #[must_use]
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = subject;
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    /// Intent label, or `"unknown"` when unresolved
    pub fn intent_label(&self) -> &str {
        self.intent.as_ref().map_or("unknown", Intent::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_intent_labels_roundtrip() {
        for intent in Intent::KNOWN {
            assert_eq!(Intent::parse(intent.as_str()), intent);
        }
        assert_eq!(Intent::parse(" Risk Analysis "), Intent::RiskAnalysis);
        assert_eq!(Intent::parse("price-trend"), Intent::PriceTrend);
        assert_eq!(
            Intent::parse("crypto_airdrop"),
            Intent::Other("crypto_airdrop".into())
        );
    }

    #[test]
    fn test_intent_groups() {
        assert!(Intent::StockNews.is_equity());
        assert!(!Intent::SectorTrend.is_equity());
        assert!(Intent::CommodityNews.is_commodity());
        assert!(!Intent::InfoGeneral.is_commodity());
    }

    #[test]
    fn test_subject_from_names() {
        assert_eq!(Subject::from_names(["  "]), Subject::None);
        assert_eq!(Subject::from_names([" TCS "]), Subject::Single("TCS".into()));
        assert_eq!(
            Subject::from_names(["TCS", "", "Infosys"]),
            Subject::Many(vec!["TCS".into(), "Infosys".into()])
        );
        assert!(Subject::Many(vec![" ".into()]).is_missing());
        assert_eq!(Subject::Single("Wipro".into()).primary(), Some("Wipro"));
    }

    #[test]
    fn test_frame_serializes_subject_as_stock_name() {
        let frame = SlotFrame {
            intent: Some(Intent::StockComparison),
            subject: Subject::Many(vec!["TCS".into(), "Infosys".into()]),
            capital: Some(dec!(500000)),
            ..Default::default()
        }
        .with_trace("TCS vs Infosys");

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["intent"], "stock_comparison");
        assert_eq!(json["stock_name"][1], "Infosys");
        assert_eq!(json["language"], "en");
        assert!(json.get("trace").is_none());
    }

    #[test]
    fn test_frame_accepts_subject_alias() {
        let frame: SlotFrame =
            serde_json::from_str(r#"{"intent": "risk_analysis", "subject": "TCS"}"#).unwrap();
        assert_eq!(frame.subject, Subject::Single("TCS".into()));
        assert_eq!(frame.language, Language::En);
    }
}
