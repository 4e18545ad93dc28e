//! Market Data
//!
//! Abstractions over the data sources the router draws on: ticker lookup,
//! price indicators, fundamentals, news sentiment, social posts, sector
//! membership and commodity quotes.

mod mock;

pub use mock::MockMarketData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Watchlist ranked by the stock screener
pub const DEFAULT_WATCHLIST: [&str; 10] = [
    "INFY.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "RELIANCE.NS",
    "HINDUNILVR.NS",
    "ITC.NS",
    "LT.NS",
    "SBIN.NS",
    "AXISBANK.NS",
];

/// Exchange codes for one listed company
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// NSE symbol, e.g. `TCS`
    pub nse: Option<String>,
    /// BSE scrip code, e.g. `532540`
    pub bse: Option<String>,
}

impl Listing {
    /// Yahoo-style ticker, NSE (`.NS`) preferred over BSE (`.BO`)
    pub fn preferred_ticker(&self) -> Option<String> {
        self.nse
            .as_deref()
            .map(|code| format!("{code}.NS"))
            .or_else(|| self.bse.as_deref().map(|code| format!("{code}.BO")))
    }
}

/// Latest close and technical indicators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub close: Decimal,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "MACD")]
    pub macd: f64,
    #[serde(rename = "EMA10")]
    pub ema10: f64,
    #[serde(rename = "EMA50")]
    pub ema50: f64,
    #[serde(rename = "ATR")]
    pub atr: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub beta: Option<f64>,
    pub sector: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub source: String,
    pub title: String,
    pub sentiment: SentimentLabel,
}

/// Aggregated news sentiment for a company
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Mean article score in [-1, 1]
    pub score: f64,
    pub articles: Vec<Headline>,
}

impl Sentiment {
    pub const fn neutral() -> Self {
        Self {
            score: 0.0,
            articles: Vec::new(),
        }
    }

    pub fn has_negative_headline(&self) -> bool {
        self.articles
            .iter()
            .any(|a| a.sentiment == SentimentLabel::Negative)
    }
}

/// One post from a social feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    pub source: String,
    pub title: String,
    pub content: String,
    pub community: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommodityQuote {
    pub symbol: String,
    pub current_price: Decimal,
    pub prev_close: Decimal,
    pub daily_change_pct: Decimal,
    pub last_30d_high: Decimal,
    pub last_30d_low: Decimal,
    pub as_of: DateTime<Utc>,
}

/// Market data provider trait (Strategy pattern)
///
/// Implement this for each data source. Lookups that find nothing return
/// `Ok(None)` or an empty list; `Err` means the source itself failed.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Exchange listing for a company name
    async fn resolve_ticker(&self, company: &str) -> Result<Option<Listing>>;

    /// Latest close and indicators for a ticker
    async fn price_data(&self, ticker: &str) -> Result<PriceData>;

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals>;

    /// News sentiment for a company name
    async fn sentiment(&self, company: &str) -> Result<Sentiment>;

    /// Social media posts mentioning a company
    async fn social_news(&self, company: &str) -> Result<Vec<SocialPost>>;

    /// Peer companies in the same sector
    async fn competitors(&self, company: &str) -> Result<Vec<String>>;

    /// Company names in a sector
    async fn sector_stocks(&self, sector: &str) -> Result<Vec<String>>;

    /// Quote for an exchange commodity symbol (`GOLD`, `CRUDEOIL`, ...)
    async fn commodity_quote(&self, symbol: &str) -> Result<CommodityQuote>;

    /// Tickers considered by the stock screener
    fn screener_watchlist(&self) -> Vec<String> {
        DEFAULT_WATCHLIST.iter().map(ToString::to_string).collect()
    }

    /// Check if the source is available
    async fn health_check(&self) -> bool;

    /// Source name
    fn name(&self) -> &str;
}
