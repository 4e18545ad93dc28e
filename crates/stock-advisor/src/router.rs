//! Intent Router
//!
//! Dispatches a complete slot frame to exactly one retrieval branch and
//! returns a typed context. Branch failures are errors whose message is
//! shown to the user as-is; the router never retries.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::commodity;
use crate::error::{AdvisorError, Result};
use crate::market::{
    CommodityQuote, Fundamentals, Listing, MarketDataProvider, PriceData, Sentiment, SocialPost,
};
use crate::portfolio::{self, PortfolioGuidance};
use crate::risk::{self, RiskAssessment};
use crate::slots::{Intent, SlotFrame};

/// Stocks kept by the screener
const SCREENER_TOP: usize = 5;

/// Names remembered by a router's ticker cache
pub const DEFAULT_TICKER_CACHE_CAPACITY: usize = 1024;

#[derive(Default)]
struct CacheEntries {
    listings: HashMap<String, Option<Listing>>,
    /// Insertion order; the oldest name is evicted first
    order: VecDeque<String>,
}

/// Memo of company name → listing, owned by one router
pub struct TickerCache {
    entries: RwLock<CacheEntries>,
    capacity: usize,
}

impl Default for TickerCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TICKER_CACHE_CAPACITY)
    }
}

impl TickerCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(CacheEntries::default()),
            capacity,
        }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Cached lookup; `Some(None)` is a remembered miss
    pub async fn get(&self, name: &str) -> Option<Option<Listing>> {
        self.entries.read().await.listings.get(&Self::key(name)).cloned()
    }

    pub async fn insert(&self, name: &str, listing: Option<Listing>) {
        let key = Self::key(name);
        let mut entries = self.entries.write().await;
        if entries.listings.insert(key.clone(), listing).is_none() {
            entries.order.push_back(key);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.listings.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.listings.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Everything retrieved for one stock
#[derive(Clone, Debug, Serialize)]
pub struct StockContext {
    pub stock: String,
    pub ticker: String,
    pub price_data: PriceData,
    pub fundamentals: Fundamentals,
    pub sentiment: Sentiment,
    pub risk: RiskAssessment,
}

#[derive(Clone, Debug, Serialize)]
pub struct PeerRisk {
    pub stock_name: String,
    pub ticker: String,
    pub risk: RiskAssessment,
}

impl From<StockContext> for PeerRisk {
    fn from(ctx: StockContext) -> Self {
        Self {
            stock_name: ctx.stock,
            ticker: ctx.ticker,
            risk: ctx.risk,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ScreenedStock {
    pub ticker: String,
    pub risk: RiskAssessment,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommodityContext {
    pub intent: Intent,
    pub commodity: String,
    pub symbol: String,
    pub quote: CommodityQuote,
}

/// Result of one retrieval branch
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RouteContext {
    SingleStock(StockContext),
    StockComparison {
        results: Vec<StockContext>,
    },
    StockNews {
        stock: String,
        social_news: Vec<SocialPost>,
    },
    CompetitorAnalysis {
        base_stock: String,
        competitors: Vec<PeerRisk>,
    },
    StockScreener {
        results: Vec<ScreenedStock>,
    },
    SectorScreener {
        sector: String,
        results: Vec<String>,
    },
    SectorTrend {
        sector: String,
        avg_risk: f64,
        trend: String,
        constituents: Vec<PeerRisk>,
    },
    Commodity(CommodityContext),
    PortfolioGuidance(PortfolioGuidance),
    InfoGeneral {
        query_text: String,
    },
}

impl RouteContext {
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::SingleStock(_) => "single_stock",
            Self::StockComparison { .. } => "stock_comparison",
            Self::StockNews { .. } => "stock_news",
            Self::CompetitorAnalysis { .. } => "competitor_analysis",
            Self::StockScreener { .. } => "stock_screener",
            Self::SectorScreener { .. } => "sector_screener",
            Self::SectorTrend { .. } => "sector_trend",
            Self::Commodity(_) => "commodity",
            Self::PortfolioGuidance(_) => "portfolio_guidance",
            Self::InfoGeneral { .. } => "info_general",
        }
    }

    /// Risk assessment of a single-stock answer
    pub const fn risk(&self) -> Option<&RiskAssessment> {
        match self {
            Self::SingleStock(ctx) => Some(&ctx.risk),
            _ => None,
        }
    }
}

pub struct IntentRouter {
    market: Arc<dyn MarketDataProvider>,
    cache: TickerCache,
}

impl IntentRouter {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            market,
            cache: TickerCache::default(),
        }
    }

    pub fn with_cache_capacity(market: Arc<dyn MarketDataProvider>, capacity: usize) -> Self {
        Self {
            market,
            cache: TickerCache::with_capacity(capacity),
        }
    }

    pub const fn cache(&self) -> &TickerCache {
        &self.cache
    }

    /// Run the branch for the frame's intent
    pub async fn route(&self, frame: &SlotFrame) -> Result<RouteContext> {
        let intent = frame
            .intent
            .as_ref()
            .ok_or_else(|| AdvisorError::MissingSlot("Intent required".into()))?;
        info!(intent = %intent, source = self.market.name(), "Routing request");

        match intent {
            Intent::RiskAnalysis | Intent::PriceTrend | Intent::BuyDecision | Intent::SellDecision => {
                let name = Self::subject(frame, "No stock specified")?;
                let ticker = self
                    .ticker_for(name)
                    .await?
                    .ok_or_else(|| AdvisorError::TickerNotFound(name.to_string()))?;
                Ok(RouteContext::SingleStock(self.stock_context(name, ticker).await?))
            }
            Intent::StockComparison => self.compare(&frame.subject.names()).await,
            Intent::StockNews => {
                let name = Self::subject(frame, "Stock name required for news")?;
                Ok(RouteContext::StockNews {
                    stock: name.to_string(),
                    social_news: self.market.social_news(name).await?,
                })
            }
            Intent::CompetitorAnalysis => {
                let name = Self::subject(frame, "Stock name required for competitor analysis")?;
                self.competitors(name).await
            }
            Intent::StockScreener => self.screen().await,
            Intent::SectorScreener => {
                let sector = Self::sector(frame)?;
                Ok(RouteContext::SectorScreener {
                    sector: sector.to_string(),
                    results: self.market.sector_stocks(sector).await?,
                })
            }
            Intent::SectorTrend => self.sector_trend(Self::sector(frame)?).await,
            Intent::CommodityTrend | Intent::CommodityNews => self.commodity(intent, frame).await,
            Intent::PortfolioGuidance => portfolio::plan(frame).map(RouteContext::PortfolioGuidance),
            Intent::InfoGeneral => Ok(RouteContext::InfoGeneral {
                query_text: frame
                    .query_text
                    .clone()
                    .unwrap_or_else(|| frame.trace().to_string()),
            }),
            Intent::Other(label) => Err(AdvisorError::UnsupportedIntent(label.clone())),
        }
    }

    fn subject<'a>(frame: &'a SlotFrame, missing: &str) -> Result<&'a str> {
        frame
            .subject
            .primary()
            .ok_or_else(|| AdvisorError::MissingSlot(missing.to_string()))
    }

    fn sector(frame: &SlotFrame) -> Result<&str> {
        frame
            .sector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AdvisorError::MissingSlot("Sector name required".into()))
    }

    /// Preferred ticker for a company, through the cache
    async fn ticker_for(&self, name: &str) -> Result<Option<String>> {
        let listing = match self.cache.get(name).await {
            Some(hit) => hit,
            None => {
                let listing = self.market.resolve_ticker(name).await?;
                self.cache.insert(name, listing.clone()).await;
                listing
            }
        };
        Ok(listing.and_then(|l| l.preferred_ticker()))
    }

    async fn stock_context(&self, name: &str, ticker: String) -> Result<StockContext> {
        let price_data = self.market.price_data(&ticker).await?;
        let fundamentals = self.market.fundamentals(&ticker).await?;
        let sentiment = self.market.sentiment(name).await?;
        let risk = risk::compute_risk_score(&price_data, &fundamentals, &sentiment);

        Ok(StockContext {
            stock: name.to_string(),
            ticker,
            price_data,
            fundamentals,
            sentiment,
            risk,
        })
    }

    /// Contexts for every name that resolves; unresolvable names are skipped
    async fn resolved_contexts(&self, names: &[&str]) -> Result<Vec<StockContext>> {
        let mut contexts = Vec::with_capacity(names.len());
        for name in names {
            match self.ticker_for(name).await? {
                Some(ticker) => contexts.push(self.stock_context(name, ticker).await?),
                None => warn!(name = %name, "No listing found, skipping"),
            }
        }
        Ok(contexts)
    }

    async fn compare(&self, names: &[&str]) -> Result<RouteContext> {
        if names.len() < 2 {
            return Err(AdvisorError::InsufficientData(
                "At least two stocks are required for comparison".into(),
            ));
        }

        let results = self.resolved_contexts(names).await?;
        if results.len() < 2 {
            return Err(AdvisorError::InsufficientData(
                "Insufficient data for stock comparison".into(),
            ));
        }
        Ok(RouteContext::StockComparison { results })
    }

    async fn competitors(&self, name: &str) -> Result<RouteContext> {
        let peers = self.market.competitors(name).await?;
        let peer_names: Vec<&str> = peers.iter().map(String::as_str).collect();

        let competitors: Vec<PeerRisk> = self
            .resolved_contexts(&peer_names)
            .await?
            .into_iter()
            .map(PeerRisk::from)
            .collect();
        if competitors.is_empty() {
            return Err(AdvisorError::InsufficientData("No competitor data available".into()));
        }

        Ok(RouteContext::CompetitorAnalysis {
            base_stock: name.to_string(),
            competitors,
        })
    }

    /// Watchlist ranked by lowest risk; sentiment is not fetched
    async fn screen(&self) -> Result<RouteContext> {
        let mut results = Vec::new();
        for ticker in self.market.screener_watchlist() {
            let price = self.market.price_data(&ticker).await?;
            let fundamentals = self.market.fundamentals(&ticker).await?;
            let risk = risk::compute_risk_score(&price, &fundamentals, &Sentiment::neutral());
            results.push(ScreenedStock { ticker, risk });
        }

        results.sort_by(|a, b| a.risk.risk_score.total_cmp(&b.risk.risk_score));
        results.truncate(SCREENER_TOP);
        Ok(RouteContext::StockScreener { results })
    }

    async fn sector_trend(&self, sector: &str) -> Result<RouteContext> {
        let stocks = self.market.sector_stocks(sector).await?;
        let names: Vec<&str> = stocks.iter().map(String::as_str).collect();
        let constituents: Vec<PeerRisk> = self
            .resolved_contexts(&names)
            .await?
            .into_iter()
            .map(PeerRisk::from)
            .collect();

        let risks: Vec<RiskAssessment> = constituents.iter().map(|c| c.risk.clone()).collect();
        let avg_risk = risk::average_risk(&risks)
            .ok_or_else(|| AdvisorError::InsufficientData("Insufficient data for sector trend".into()))?;

        Ok(RouteContext::SectorTrend {
            sector: sector.to_string(),
            avg_risk,
            trend: risk::sector_trend_label(avg_risk).to_string(),
            constituents,
        })
    }

    async fn commodity(&self, intent: &Intent, frame: &SlotFrame) -> Result<RouteContext> {
        let name = frame
            .commodity
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AdvisorError::MissingSlot("Commodity name required".into()))?;
        let symbol = commodity::resolve_symbol(name)
            .ok_or_else(|| AdvisorError::UnsupportedCommodity(name.to_string()))?;

        Ok(RouteContext::Commodity(CommodityContext {
            intent: intent.clone(),
            commodity: name.to_string(),
            symbol: symbol.to_string(),
            quote: self.market.commodity_quote(symbol).await?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use crate::risk::RiskClass;
    use crate::slots::Subject;
    use rust_decimal_macros::dec;

    fn router() -> IntentRouter {
        IntentRouter::new(Arc::new(MockMarketData::new()))
    }

    fn frame(intent: Intent, names: &[&str]) -> SlotFrame {
        SlotFrame::default()
            .with_intent(intent)
            .with_subject(Subject::from_names(names))
    }

    #[tokio::test]
    async fn test_single_stock() {
        let ctx = router().route(&frame(Intent::RiskAnalysis, &["TCS"])).await.unwrap();

        let RouteContext::SingleStock(stock) = &ctx else {
            panic!("expected single stock, got {}", ctx.mode());
        };
        assert_eq!(stock.ticker, "TCS.NS");
        assert!((stock.risk.risk_score - 0.15).abs() < 1e-9);
        assert!((stock.risk.confidence - 0.30).abs() < 1e-9);
        assert_eq!(stock.risk.classification, RiskClass::Low);
        assert_eq!(ctx.risk().map(|r| r.classification), Some(RiskClass::Low));

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["mode"], "single_stock");
        assert_eq!(json["price_data"]["RSI"], 58.2);
    }

    #[tokio::test]
    async fn test_bse_fallback() {
        let ctx = router()
            .route(&frame(Intent::PriceTrend, &["Vadilal Enterprises"]))
            .await
            .unwrap();
        let RouteContext::SingleStock(stock) = ctx else {
            panic!("expected single stock");
        };
        assert_eq!(stock.ticker, "519152.BO");
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let err = router()
            .route(&frame(Intent::BuyDecision, &["Acme Widgets"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Ticker not found for Acme Widgets");
    }

    #[tokio::test]
    async fn test_comparison() {
        let router = router();

        let ctx = router
            .route(&frame(Intent::StockComparison, &["TCS", "Infosys"]))
            .await
            .unwrap();
        let RouteContext::StockComparison { results } = ctx else {
            panic!("expected comparison");
        };
        assert_eq!(results.len(), 2);

        let err = router
            .route(&frame(Intent::StockComparison, &["TCS"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "At least two stocks are required for comparison");

        let err = router
            .route(&frame(Intent::StockComparison, &["TCS", "Acme Widgets"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient data for stock comparison");
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_branch() {
        let router = IntentRouter::new(Arc::new(MockMarketData::new().with_failing_ticker("INFY.NS")));
        let err = router
            .route(&frame(Intent::StockComparison, &["TCS", "Infosys", "Wipro"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Provider(_)));
    }

    #[tokio::test]
    async fn test_competitors() {
        let ctx = router()
            .route(&frame(Intent::CompetitorAnalysis, &["TCS"]))
            .await
            .unwrap();
        let RouteContext::CompetitorAnalysis { base_stock, competitors } = ctx else {
            panic!("expected competitor analysis");
        };
        assert_eq!(base_stock, "TCS");
        assert_eq!(competitors.len(), 4);

        let err = router()
            .route(&frame(Intent::CompetitorAnalysis, &["Acme Widgets"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No competitor data available");
    }

    #[tokio::test]
    async fn test_screener_ranks_lowest_risk() {
        let ctx = router().route(&frame(Intent::StockScreener, &[])).await.unwrap();
        let RouteContext::StockScreener { results } = ctx else {
            panic!("expected screener");
        };
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(
            tickers,
            vec!["INFY.NS", "HDFCBANK.NS", "ICICIBANK.NS", "ITC.NS", "TCS.NS"]
        );
    }

    #[tokio::test]
    async fn test_sector_trend() {
        let mut f = frame(Intent::SectorTrend, &[]);
        f.sector = Some("IT".into());
        let RouteContext::SectorTrend { avg_risk, trend, constituents, .. } = router().route(&f).await.unwrap() else {
            panic!("expected sector trend");
        };
        assert_eq!(constituents.len(), 5);
        assert!((avg_risk - 0.19).abs() < 1e-9);
        assert_eq!(trend, "Relatively Stable");

        f.sector = Some("EV".into());
        let RouteContext::SectorTrend { avg_risk, trend, .. } = router().route(&f).await.unwrap() else {
            panic!("expected sector trend");
        };
        assert!((avg_risk - 0.48).abs() < 1e-9);
        assert_eq!(trend, "Moderate Volatility");

        f.sector = Some("space tourism".into());
        let err = router().route(&f).await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient data for sector trend");
    }

    #[tokio::test]
    async fn test_sector_screener() {
        let mut f = frame(Intent::SectorScreener, &[]);
        f.sector = Some("banking".into());
        let RouteContext::SectorScreener { results, .. } = router().route(&f).await.unwrap() else {
            panic!("expected sector screener");
        };
        assert!(results.contains(&"HDFC Bank".to_string()));
    }

    #[tokio::test]
    async fn test_commodity() {
        let mut f = frame(Intent::CommodityTrend, &[]);
        f.commodity = Some("gold".into());
        let RouteContext::Commodity(ctx) = router().route(&f).await.unwrap() else {
            panic!("expected commodity");
        };
        assert_eq!(ctx.symbol, "GOLD");
        assert_eq!(ctx.quote.current_price, dec!(76250));

        f.commodity = Some("bitcoin".into());
        let err = router().route(&f).await.unwrap_err();
        assert!(matches!(err, AdvisorError::UnsupportedCommodity(_)));
    }

    #[tokio::test]
    async fn test_portfolio_and_info() {
        let mut f = frame(Intent::PortfolioGuidance, &[]);
        f.capital = Some(dec!(500000));
        let ctx = router().route(&f).await.unwrap();
        assert_eq!(ctx.mode(), "portfolio_guidance");

        let f = SlotFrame::default()
            .with_intent(Intent::InfoGeneral)
            .with_trace("What is a demat account?");
        let RouteContext::InfoGeneral { query_text } = router().route(&f).await.unwrap() else {
            panic!("expected info");
        };
        assert_eq!(query_text, "What is a demat account?");
    }

    #[tokio::test]
    async fn test_unsupported_intent() {
        let err = router()
            .route(&frame(Intent::Other("crypto_airdrop".into()), &["TCS"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported intent");
    }

    #[tokio::test]
    async fn test_ticker_cache() {
        let router = router();
        router.route(&frame(Intent::RiskAnalysis, &["TCS"])).await.unwrap();
        router.route(&frame(Intent::PriceTrend, &[" tcs "])).await.unwrap();
        assert_eq!(router.cache().len().await, 1);

        let _ = router.route(&frame(Intent::RiskAnalysis, &["Acme Widgets"])).await;
        assert_eq!(router.cache().get("acme widgets").await, Some(None));
    }

    #[tokio::test]
    async fn test_ticker_cache_evicts_oldest() {
        let cache = TickerCache::with_capacity(2);
        cache.insert("TCS", None).await;
        cache.insert("Wipro", None).await;
        cache.insert("tcs", None).await;
        assert_eq!(cache.len().await, 2);

        cache.insert("Infosys", None).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("TCS").await, None);
        assert_eq!(cache.get("wipro").await, Some(None));
        assert_eq!(cache.get("infosys").await, Some(None));
    }

    #[tokio::test]
    async fn test_unknown_names_do_not_grow_cache() {
        let router = IntentRouter::with_cache_capacity(Arc::new(MockMarketData::new()), 3);
        for i in 0..10 {
            let name = format!("Made Up Company {i}");
            assert!(router.route(&frame(Intent::RiskAnalysis, &[name.as_str()])).await.is_err());
        }
        assert_eq!(router.cache().len().await, 3);
        assert_eq!(router.cache().capacity(), 3);
    }
}
