//! Explainer
//!
//! Rule-based, locale-aware text for every branch. Used directly when the
//! narrative model is unavailable and as the data summary it works from.
//! Every text ends with the disclaimer.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::risk::{RiskAssessment, RiskClass};
use crate::router::{PeerRisk, RouteContext};
use crate::slots::{InvestorType, Language};

pub const DISCLAIMER: &str = "⚠️ This is a data-based analytical insight, not financial advice.";
pub const DISCLAIMER_HI: &str = "⚠️ यह डेटा आधारित विश्लेषण है, निवेश सलाह नहीं।";

pub const fn disclaimer(language: Language) -> &'static str {
    match language {
        Language::En => DISCLAIMER,
        Language::Hi => DISCLAIMER_HI,
    }
}

/// Make the disclaimer the last line, exactly once, in `language`
pub fn ensure_disclaimer(text: &str, language: Language) -> String {
    let disclaimer = disclaimer(language);
    let body = text.replace(DISCLAIMER, "").replace(DISCLAIMER_HI, "");
    let body = body.trim();
    if body.is_empty() {
        disclaimer.to_string()
    } else {
        format!("{body}\n\n{disclaimer}")
    }
}

/// Machine-readable companion to the explanation text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationSummary {
    pub stock_name: String,
    pub risk_score: f64,
    pub confidence: f64,
    pub classification: RiskClass,
    pub reasons: Vec<String>,
    pub sources: Vec<String>,
    pub disclaimer: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub summary: ExplanationSummary,
}

/// Explain one stock's risk assessment
pub fn explain_result(
    stock_name: &str,
    risk: &RiskAssessment,
    language: Language,
    source: &str,
) -> Explanation {
    let key_points = if risk.reasons.is_empty() {
        match language {
            Language::En => "Stable indicators overall.".to_string(),
            Language::Hi => "कुल मिलाकर संकेतक स्थिर हैं।".to_string(),
        }
    } else {
        let joined = risk.reasons.iter().take(3).cloned().collect::<Vec<_>>().join("; ");
        match language {
            Language::En => format!("{joined}."),
            Language::Hi => format!("{joined}।"),
        }
    };

    let text = match language {
        Language::En => format!(
            "{stock_name} shows a **{} risk ({:.2})** with confidence {:.2}. Key indicators: {key_points} {DISCLAIMER}",
            risk.classification, risk.risk_score, risk.confidence
        ),
        Language::Hi => format!(
            "{stock_name} का जोखिम स्तर **{} ({:.2})** है। विश्वास स्तर: {:.2}। मुख्य कारण: {key_points} {DISCLAIMER_HI}",
            risk.classification.as_hindi(),
            risk.risk_score,
            risk.confidence
        ),
    };

    Explanation {
        text,
        summary: ExplanationSummary {
            stock_name: stock_name.to_string(),
            risk_score: risk.risk_score,
            confidence: risk.confidence,
            classification: risk.classification,
            reasons: risk.reasons.clone(),
            sources: vec![source.to_string()],
            disclaimer: disclaimer(language).to_string(),
        },
    }
}

/// Rule-based answer for any branch
pub fn describe(context: &RouteContext, language: Language, source: &str) -> String {
    let hi = language == Language::Hi;

    let body = match context {
        RouteContext::SingleStock(stock) => {
            return explain_result(&stock.stock, &stock.risk, language, source).text;
        }
        RouteContext::StockComparison { results } => {
            let peers: Vec<PeerRisk> = results.iter().cloned().map(PeerRisk::from).collect();
            let head = if hi { "तुलना" } else { "Comparison" };
            format!("{head}: {}", peer_list(&peers, language))
        }
        RouteContext::CompetitorAnalysis { base_stock, competitors } => {
            if hi {
                format!("{base_stock} के प्रतिस्पर्धी: {}", peer_list(competitors, language))
            } else {
                format!("Competitors of {base_stock}: {}", peer_list(competitors, language))
            }
        }
        RouteContext::StockNews { stock, social_news } => {
            if social_news.is_empty() {
                if hi {
                    format!("{stock} के बारे में हाल की कोई सोशल पोस्ट नहीं मिली।")
                } else {
                    format!("No recent social posts found for {stock}.")
                }
            } else {
                let mut text = if hi {
                    format!("{stock} पर हाल की चर्चा:")
                } else {
                    format!("Recent discussion about {stock}:")
                };
                for post in social_news.iter().take(5) {
                    let _ = write!(text, "\n- [{}] {}", post.source, post.title);
                }
                text
            }
        }
        RouteContext::StockScreener { results } => {
            let list = results
                .iter()
                .map(|r| format!("{} ({:.2})", r.ticker, r.risk.risk_score))
                .collect::<Vec<_>>()
                .join(", ");
            if hi {
                format!("वॉचलिस्ट में सबसे कम जोखिम वाले स्टॉक: {list}")
            } else {
                format!("Lowest-risk stocks on the watchlist: {list}")
            }
        }
        RouteContext::SectorScreener { sector, results } => match (results.is_empty(), hi) {
            (true, false) => format!("No stocks found for the {sector} sector."),
            (true, true) => format!("{sector} सेक्टर में कोई स्टॉक नहीं मिला।"),
            (false, false) => format!("Stocks in the {sector} sector: {}.", results.join(", ")),
            (false, true) => format!("{sector} सेक्टर के स्टॉक: {}।", results.join(", ")),
        },
        RouteContext::SectorTrend {
            sector,
            avg_risk,
            trend,
            constituents,
        } => {
            if hi {
                format!(
                    "{sector} सेक्टर की स्थिति: {trend} ({} स्टॉक्स का औसत जोखिम {avg_risk:.2})।",
                    constituents.len()
                )
            } else {
                format!(
                    "The {sector} sector currently looks {trend} (average risk {avg_risk:.2} across {} stocks).",
                    constituents.len()
                )
            }
        }
        RouteContext::Commodity(ctx) => {
            let q = &ctx.quote;
            let change = signed(q.daily_change_pct);
            if hi {
                format!(
                    "{} ({}) का भाव ₹{}, आज {change}%। पिछले 30 दिन की रेंज ₹{} से ₹{}।",
                    ctx.commodity, ctx.symbol, q.current_price, q.last_30d_low, q.last_30d_high
                )
            } else {
                format!(
                    "{} ({}) is at ₹{}, {change}% on the day. 30-day range: ₹{} to ₹{}.",
                    ctx.commodity, ctx.symbol, q.current_price, q.last_30d_low, q.last_30d_high
                )
            }
        }
        RouteContext::PortfolioGuidance(guidance) => {
            let mut text = if hi {
                format!(
                    "₹{} के लिए ({} प्रोफ़ाइल) एक सामान्य बंटवारा:",
                    guidance.capital,
                    investor_label(guidance.investor_type)
                )
            } else {
                format!(
                    "For ₹{} with a {} profile, a common split is:",
                    guidance.capital,
                    investor_label(guidance.investor_type)
                )
            };
            for slice in &guidance.allocations {
                let _ = write!(
                    text,
                    "\n- {} {}% (₹{}): {}",
                    slice.asset_class, slice.percent, slice.amount, slice.rationale
                );
            }
            text
        }
        RouteContext::InfoGeneral { query_text } => {
            if hi {
                format!("आपका सवाल: \"{query_text}\"। अभी इसका विस्तृत उत्तर उपलब्ध नहीं है।")
            } else {
                format!("You asked: \"{query_text}\". A detailed answer is not available right now.")
            }
        }
    };

    format!("{body}\n\n{}", disclaimer(language))
}

fn peer_list(peers: &[PeerRisk], language: Language) -> String {
    peers
        .iter()
        .map(|p| {
            let class = match language {
                Language::En => p.risk.classification.as_str(),
                Language::Hi => p.risk.classification.as_hindi(),
            };
            format!("{} {class} ({:.2})", p.stock_name, p.risk.risk_score)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        value.to_string()
    } else {
        format!("+{value}")
    }
}

const fn investor_label(investor: InvestorType) -> &'static str {
    match investor {
        InvestorType::Conservative => "conservative",
        InvestorType::Moderate => "moderate",
        InvestorType::Aggressive => "aggressive",
    }
}
