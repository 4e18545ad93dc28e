//! Portfolio Guidance
//!
//! Splits investable capital across broad asset classes by investor type.
//! Uses `rust_decimal` for all monetary values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::slots::{InvestmentHorizon, InvestorType, RiskTolerance, SlotFrame};

/// (asset class, percent, rationale)
type Split = &'static [(&'static str, Decimal, &'static str)];

const CONSERVATIVE: Split = &[
    ("Large-cap equity", dec!(30), "Established companies for steady growth"),
    ("Debt funds", dec!(50), "Capital preservation and regular income"),
    ("Gold", dec!(10), "Hedge against inflation and market stress"),
    ("Cash / liquid funds", dec!(10), "Emergency buffer and dry powder"),
];

const MODERATE: Split = &[
    ("Large-cap equity", dec!(45), "Core growth from market leaders"),
    ("Mid-cap equity", dec!(15), "Higher growth with higher volatility"),
    ("Debt funds", dec!(30), "Stability for the portfolio"),
    ("Gold", dec!(10), "Hedge against inflation and market stress"),
];

const AGGRESSIVE: Split = &[
    ("Large-cap equity", dec!(40), "Anchor holdings"),
    ("Mid/small-cap equity", dec!(35), "Growth potential with large swings"),
    ("Debt funds", dec!(15), "Cushion during drawdowns"),
    ("Gold", dec!(10), "Hedge against inflation and market stress"),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub asset_class: String,
    pub percent: Decimal,
    pub amount: Decimal,
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioGuidance {
    pub capital: Decimal,
    pub investor_type: InvestorType,
    pub investment_horizon: Option<InvestmentHorizon>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub target_return_pct: Option<f64>,
    pub allocations: Vec<AllocationSlice>,
    pub query_text: Option<String>,
}

/// Investor type from the frame, else from risk tolerance, else moderate
pub const fn resolve_investor_type(
    investor_type: Option<InvestorType>,
    risk_tolerance: Option<RiskTolerance>,
) -> InvestorType {
    match (investor_type, risk_tolerance) {
        (Some(investor), _) => investor,
        (None, Some(RiskTolerance::Low)) => InvestorType::Conservative,
        (None, Some(RiskTolerance::High)) => InvestorType::Aggressive,
        (None, Some(RiskTolerance::Medium) | None) => InvestorType::Moderate,
    }
}

/// Build capital guidance for a `portfolio_guidance` frame
pub fn plan(frame: &SlotFrame) -> Result<PortfolioGuidance> {
    let capital = frame
        .capital
        .filter(|c| *c > Decimal::ZERO)
        .ok_or_else(|| AdvisorError::MissingSlot("Capital required for portfolio guidance".into()))?;
    let investor_type = resolve_investor_type(frame.investor_type, frame.risk_tolerance);

    Ok(PortfolioGuidance {
        capital,
        investor_type,
        investment_horizon: frame.investment_horizon,
        risk_tolerance: frame.risk_tolerance,
        target_return_pct: frame.target_return_pct,
        allocations: allocate(capital, investor_type),
        query_text: frame.query_text.clone(),
    })
}

/// Split `capital`; the last slice absorbs rounding so amounts sum to capital
pub fn allocate(capital: Decimal, investor_type: InvestorType) -> Vec<AllocationSlice> {
    let split = match investor_type {
        InvestorType::Conservative => CONSERVATIVE,
        InvestorType::Moderate => MODERATE,
        InvestorType::Aggressive => AGGRESSIVE,
    };

    let total = capital.round_dp(2);
    let mut remaining = total;
    let mut slices = Vec::with_capacity(split.len());

    for (i, (asset_class, percent, rationale)) in split.iter().enumerate() {
        let amount = if i + 1 == split.len() {
            remaining
        } else {
            (total * *percent / dec!(100)).round_dp(2).min(remaining)
        };
        remaining -= amount;

        slices.push(AllocationSlice {
            asset_class: (*asset_class).to_string(),
            percent: *percent,
            amount,
            rationale: (*rationale).to_string(),
        });
    }

    slices
}
