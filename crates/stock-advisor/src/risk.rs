//! Risk Engine
//!
//! Fixed linear scoring over technical, sentiment and fundamental signals.
//! Points are accumulated in hundredths so class boundaries are exact.
//!
//! | Signal                     | Points |
//! |----------------------------|--------|
//! | RSI > 70                   | 0.15   |
//! | MACD < 0                   | 0.10   |
//! | EMA10 < EMA50              | 0.10   |
//! | ATR > 5                    | 0.05   |
//! | sentiment score < 0        | 0.15   |
//! | any negative headline      | 0.15   |
//! | PE > 30                    | 0.10   |
//! | EPS < 0                    | 0.10   |
//! | beta > 1.2                 | 0.05   |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market::{Fundamentals, PriceData, Sentiment};

const DEFAULT_BETA: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

impl RiskClass {
    /// Low below 40 points, Medium up to and including 70, High above
    const fn from_points(points: u32) -> Self {
        if points < 40 {
            Self::Low
        } else if points <= 70 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub const fn as_hindi(self) -> &'static str {
        match self {
            Self::Low => "कम",
            Self::Medium => "मध्यम",
            Self::High => "उच्च",
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// In [0, 1], two decimals
    pub risk_score: f64,
    /// In [0, 1], two decimals
    pub confidence: f64,
    pub classification: RiskClass,
    /// Triggered signals, in table order
    pub reasons: Vec<String>,
}

/// Score one stock
pub fn compute_risk_score(
    price: &PriceData,
    fundamentals: &Fundamentals,
    sentiment: &Sentiment,
) -> RiskAssessment {
    let mut points = 0u32;
    let mut reasons = Vec::new();
    let mut add = |value: u32, reason: String| {
        points += value;
        reasons.push(reason);
    };

    if price.rsi > 70.0 {
        add(15, "RSI > 70 (overbought)".into());
    }
    if price.macd < 0.0 {
        add(10, "MACD < 0 (bearish)".into());
    }
    if price.ema10 < price.ema50 {
        add(10, "EMA10 < EMA50 (short-term weakness)".into());
    }
    if price.atr > 5.0 {
        add(5, "ATR high (volatility warning)".into());
    }

    if sentiment.score < 0.0 {
        add(15, "Negative market/news sentiment".into());
    }
    if sentiment.has_negative_headline() {
        add(15, "Recent negative headlines".into());
    }

    if let Some(pe) = fundamentals.pe_ratio.filter(|pe| *pe > 30.0) {
        add(10, format!("PE ratio high ({pe:.1})"));
    }
    if fundamentals.eps.is_some_and(|eps| eps < 0.0) {
        add(10, "Negative EPS (loss-making)".into());
    }

    let beta = fundamentals.beta.unwrap_or(DEFAULT_BETA);
    if beta > 1.2 {
        add(5, format!("High beta ({beta:.2}), sensitive to market moves"));
    }

    let points = points.min(100);
    let assessment = RiskAssessment {
        risk_score: f64::from(points) / 100.0,
        confidence: confidence(price),
        classification: RiskClass::from_points(points),
        reasons,
    };

    debug!(
        rsi = price.rsi,
        macd = price.macd,
        ema10 = price.ema10,
        ema50 = price.ema50,
        atr = price.atr,
        pe = ?fundamentals.pe_ratio,
        eps = ?fundamentals.eps,
        beta,
        sentiment = sentiment.score,
        articles = sentiment.articles.len(),
        risk_score = assessment.risk_score,
        confidence = assessment.confidence,
        class = %assessment.classification,
        "Risk score computed"
    );

    assessment
}

/// 1 − min(ATR / (|EMA10 − EMA50| + 1e-5), 1)
fn confidence(price: &PriceData) -> f64 {
    let trend = (price.ema10 - price.ema50).abs();
    let noise = (price.atr / (trend + 1e-5)).min(1.0);
    let confidence = (1.0 - noise).clamp(0.0, 1.0);

    if confidence.is_finite() {
        round2(confidence)
    } else {
        0.0
    }
}

/// Mean risk score, two decimals
pub fn average_risk(assessments: &[RiskAssessment]) -> Option<f64> {
    if assessments.is_empty() {
        return None;
    }
    let total: f64 = assessments.iter().map(|a| a.risk_score).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = total / assessments.len() as f64;
    Some(round2(mean))
}

/// Trend label for a sector's mean risk
pub fn sector_trend_label(avg_risk: f64) -> &'static str {
    if avg_risk < 0.4 {
        "Relatively Stable"
    } else if avg_risk < 0.7 {
        "Moderate Volatility"
    } else {
        "High Volatility"
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Headline, SentimentLabel};
    use rust_decimal_macros::dec;

    fn calm_price() -> PriceData {
        PriceData {
            close: dec!(1000),
            rsi: 50.0,
            macd: 1.0,
            ema10: 1010.0,
            ema50: 1000.0,
            atr: 4.0,
        }
    }

    #[test]
    fn test_no_signals() {
        let risk = compute_risk_score(&calm_price(), &Fundamentals::default(), &Sentiment::neutral());
        assert!(risk.risk_score.abs() < f64::EPSILON);
        assert_eq!(risk.classification, RiskClass::Low);
        assert!(risk.reasons.is_empty());
        assert!((risk.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_every_signal() {
        let price = PriceData {
            rsi: 75.0,
            macd: -2.0,
            ema10: 990.0,
            atr: 12.0,
            ..calm_price()
        };
        let fundamentals = Fundamentals {
            pe_ratio: Some(48.6),
            eps: Some(-3.0),
            beta: Some(1.5),
            sector: None,
        };
        let sentiment = Sentiment {
            score: -0.2,
            articles: vec![Headline {
                source: "Mint".into(),
                title: "Profit warning".into(),
                sentiment: SentimentLabel::Negative,
            }],
        };

        let risk = compute_risk_score(&price, &fundamentals, &sentiment);
        assert!((risk.risk_score - 0.95).abs() < 1e-9);
        assert_eq!(risk.classification, RiskClass::High);
        assert_eq!(
            risk.reasons,
            vec![
                "RSI > 70 (overbought)",
                "MACD < 0 (bearish)",
                "EMA10 < EMA50 (short-term weakness)",
                "ATR high (volatility warning)",
                "Negative market/news sentiment",
                "Recent negative headlines",
                "PE ratio high (48.6)",
                "Negative EPS (loss-making)",
                "High beta (1.50), sensitive to market moves",
            ]
        );
        // ATR exceeds the EMA spread
        assert!(risk.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_class_boundaries() {
        assert_eq!(RiskClass::from_points(39), RiskClass::Low);
        assert_eq!(RiskClass::from_points(40), RiskClass::Medium);
        assert_eq!(RiskClass::from_points(70), RiskClass::Medium);
        assert_eq!(RiskClass::from_points(71), RiskClass::High);
    }

    #[test]
    fn test_missing_beta_defaults_to_market() {
        let fundamentals = Fundamentals {
            beta: None,
            ..Default::default()
        };
        let risk = compute_risk_score(&calm_price(), &fundamentals, &Sentiment::neutral());
        assert!(risk.reasons.iter().all(|r| !r.contains("beta")));
    }

    #[test]
    fn test_flat_trend_confidence_is_finite() {
        let price = PriceData {
            ema10: 1000.0,
            atr: 0.0,
            ..calm_price()
        };
        let risk = compute_risk_score(&price, &Fundamentals::default(), &Sentiment::neutral());
        assert!((risk.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sector_trend_thresholds() {
        assert_eq!(sector_trend_label(0.0), "Relatively Stable");
        assert_eq!(sector_trend_label(0.39), "Relatively Stable");
        assert_eq!(sector_trend_label(0.4), "Moderate Volatility");
        assert_eq!(sector_trend_label(0.69), "Moderate Volatility");
        assert_eq!(sector_trend_label(0.7), "High Volatility");
    }

    #[test]
    fn test_average_risk() {
        let risk = |score: f64| RiskAssessment {
            risk_score: score,
            confidence: 0.5,
            classification: RiskClass::Low,
            reasons: Vec::new(),
        };
        assert_eq!(average_risk(&[]), None);
        assert_eq!(average_risk(&[risk(0.15), risk(0.25), risk(0.55)]), Some(0.32));
    }
}
