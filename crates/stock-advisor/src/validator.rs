//! Field Validator
//!
//! One canonical table of mandatory fields per intent.

use crate::slots::{Intent, SlotField, SlotFrame};

use SlotField::{Capital, Commodity, Language, QueryText, Sector, Subject};

/// Mandatory fields for `intent`, in the order they should be asked for
pub fn required_fields(intent: &Intent) -> &'static [SlotField] {
    match intent {
        Intent::RiskAnalysis
        | Intent::PriceTrend
        | Intent::BuyDecision
        | Intent::SellDecision
        | Intent::StockNews
        | Intent::StockComparison
        | Intent::CompetitorAnalysis => &[SlotField::Intent, Language, Subject],
        Intent::SectorScreener | Intent::SectorTrend => &[SlotField::Intent, Language, Sector],
        Intent::PortfolioGuidance => &[SlotField::Intent, Language, Capital],
        Intent::CommodityTrend | Intent::CommodityNews => &[SlotField::Intent, Language, Commodity],
        Intent::InfoGeneral => &[SlotField::Intent, Language, QueryText],
        Intent::StockScreener | Intent::Other(_) => &[SlotField::Intent, Language],
    }
}

/// Mandatory fields that are absent or blank, in declared order
///
/// An unresolved intent short-circuits to `[intent]`. The screener never
/// asks for a subject.
pub fn missing_fields(frame: &SlotFrame) -> Vec<SlotField> {
    let Some(intent) = &frame.intent else {
        return vec![SlotField::Intent];
    };

    required_fields(intent)
        .iter()
        .copied()
        .filter(|field| !(*intent == Intent::StockScreener && *field == Subject))
        .filter(|field| is_missing(frame, *field))
        .collect()
}

fn is_missing(frame: &SlotFrame, field: SlotField) -> bool {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

    match field {
        SlotField::Intent => frame.intent.is_none(),
        // always resolved at coercion
        Language => false,
        Subject => frame.subject.is_missing(),
        Sector => blank(&frame.sector),
        Capital => frame.capital.is_none(),
        Commodity => blank(&frame.commodity),
        QueryText => blank(&frame.query_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots;

    #[test]
    fn test_empty_frame_needs_intent() {
        assert_eq!(missing_fields(&SlotFrame::default()), vec![SlotField::Intent]);
    }

    #[test]
    fn test_intent_only_frames() {
        for intent in Intent::KNOWN.into_iter().chain([Intent::Other("x".into())]) {
            let expected: Vec<SlotField> = required_fields(&intent)
                .iter()
                .copied()
                .filter(|f| !matches!(f, SlotField::Intent | Language))
                .filter(|f| !(intent == Intent::StockScreener && *f == Subject))
                .collect();

            let frame = SlotFrame::default().with_intent(intent.clone());
            assert_eq!(missing_fields(&frame), expected, "intent {intent}");
        }
    }

    #[test]
    fn test_blank_values_are_missing() {
        let frame = SlotFrame {
            intent: Some(Intent::SectorTrend),
            sector: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(missing_fields(&frame), vec![Sector]);

        let frame = SlotFrame::default()
            .with_intent(Intent::StockComparison)
            .with_subject(slots::Subject::Many(vec![String::new(), " ".into()]));
        assert_eq!(missing_fields(&frame), vec![Subject]);
    }

    #[test]
    fn test_complete_frame() {
        let frame = SlotFrame::default()
            .with_intent(Intent::RiskAnalysis)
            .with_subject(slots::Subject::Single("TCS".into()));
        assert!(missing_fields(&frame).is_empty());
    }

    #[test]
    fn test_screener_ignores_subject() {
        let frame = SlotFrame::default().with_intent(Intent::StockScreener);
        assert!(missing_fields(&frame).is_empty());
    }
}
