//! Post-Extraction Overrides
//!
//! Deterministic corrections applied to every extracted frame before it is
//! validated. All rules are idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::commodity;
use crate::slots::{Intent, SlotFrame, Subject};

static SUBJECT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:,|\b(?:vs|versus|or|compare)\b\.?)\s*").unwrap());

/// Apply every rule in order
pub fn apply(frame: &mut SlotFrame) {
    split_subjects(frame);
    commodity_override(frame);
    scrub_informational(frame);

    if frame.intent == Some(Intent::PortfolioGuidance) && frame.query_text.is_none() {
        frame.query_text = Some(frame.trace.clone());
    }
}

/// "TCS vs Infosys" → `Many(["TCS", "Infosys"])`
pub fn split_subjects(frame: &mut SlotFrame) {
    let names: Vec<String> = frame
        .subject
        .names()
        .into_iter()
        .flat_map(|name| SUBJECT_SEPARATOR.split(name))
        .map(str::to_string)
        .collect();
    frame.subject = Subject::from_names(names);
}

/// Route commodity questions to the commodity branches
///
/// A commodity keyword in the trace rewrites an equity or unresolved intent
/// (`stock_news` becomes `commodity_news`, anything else `commodity_trend`)
/// and clears the subject. Commodity intents never keep a subject.
pub fn commodity_override(frame: &mut SlotFrame) {
    let keyword = commodity::find_keyword(&frame.trace);

    match (frame.intent.clone(), keyword) {
        (None, Some(keyword)) => {
            tracing::debug!(keyword = %keyword, "Commodity keyword with no intent");
            frame.intent = Some(Intent::CommodityTrend);
            frame.commodity = Some(keyword);
        }
        (Some(intent), Some(keyword)) if intent.is_equity() => {
            tracing::debug!(from = %intent, keyword = %keyword, "Commodity keyword overrides equity intent");
            frame.intent = Some(if intent == Intent::StockNews {
                Intent::CommodityNews
            } else {
                Intent::CommodityTrend
            });
            frame.commodity = Some(keyword);
        }
        (Some(intent), keyword) if intent.is_commodity() => {
            let blank = frame.commodity.as_deref().is_none_or(|c| c.trim().is_empty());
            if blank {
                frame.commodity = keyword.or_else(|| frame.subject.primary().map(str::to_string));
            }
        }
        _ => return,
    }

    frame.subject = Subject::None;
}

/// Informational questions carry only the raw question
pub fn scrub_informational(frame: &mut SlotFrame) {
    if frame.intent != Some(Intent::InfoGeneral) {
        return;
    }
    frame.subject = Subject::None;
    frame.commodity = None;
    frame.sector = None;
    frame.query_text = Some(frame.trace.clone());
}
