//! Mock Market Data
//!
//! For testing and demo purposes. A fixed universe of Indian listed
//! companies with realistic static indicators, plus MCX commodity quotes.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{
    CommodityQuote, Fundamentals, Headline, Listing, MarketDataProvider, PriceData, Sentiment,
    SentimentLabel, SocialPost,
};
use crate::error::{AdvisorError, Result};

use SentimentLabel::{Negative, Neutral, Positive};

struct Company {
    name: &'static str,
    /// Lowercase names the company is known by
    aliases: &'static [&'static str],
    nse: Option<&'static str>,
    bse: Option<&'static str>,
    /// Primary sector first
    sectors: &'static [&'static str],
    close: Decimal,
    // (RSI, MACD, EMA10, EMA50, ATR)
    indicators: (f64, f64, f64, f64, f64),
    pe_ratio: Option<f64>,
    eps: Option<f64>,
    beta: Option<f64>,
    sentiment: f64,
    headlines: &'static [(&'static str, SentimentLabel)],
}

impl Company {
    fn ticker(&self) -> Option<String> {
        self.listing().preferred_ticker()
    }

    fn listing(&self) -> Listing {
        Listing {
            nse: self.nse.map(str::to_string),
            bse: self.bse.map(str::to_string),
        }
    }

    fn price_data(&self) -> PriceData {
        let (rsi, macd, ema10, ema50, atr) = self.indicators;
        PriceData {
            close: self.close,
            rsi,
            macd,
            ema10,
            ema50,
            atr,
        }
    }
}

const UNIVERSE: &[Company] = &[
    Company {
        name: "Tata Consultancy Services",
        aliases: &["tcs", "tata consultancy services", "tata consultancy"],
        nse: Some("TCS"),
        bse: Some("532540"),
        sectors: &["IT"],
        close: dec!(4120.50),
        indicators: (58.2, 12.4, 4098.0, 4010.0, 62.0),
        pe_ratio: Some(31.5),
        eps: Some(130.8),
        beta: Some(0.62),
        sentiment: 0.4,
        headlines: &[
            ("TCS wins multi-year deal with European insurer", Positive),
            ("TCS headcount stable as hiring resumes", Neutral),
        ],
    },
    Company {
        name: "Infosys",
        aliases: &["infosys", "infy"],
        nse: Some("INFY"),
        bse: Some("500209"),
        sectors: &["IT"],
        close: dec!(1875.30),
        indicators: (64.1, 8.2, 1860.0, 1795.0, 31.5),
        pe_ratio: Some(28.4),
        eps: Some(66.0),
        beta: Some(0.71),
        sentiment: 0.3,
        headlines: &[("Infosys raises FY revenue guidance", Positive)],
    },
    Company {
        name: "Wipro",
        aliases: &["wipro"],
        nse: Some("WIPRO"),
        bse: Some("507685"),
        sectors: &["IT"],
        close: dec!(298.40),
        indicators: (44.5, -1.8, 296.1, 301.7, 6.2),
        pe_ratio: Some(23.9),
        eps: Some(12.5),
        beta: Some(0.85),
        sentiment: -0.1,
        headlines: &[
            ("Wipro trims revenue outlook on weak discretionary spend", Negative),
            ("Wipro announces buyback record date", Neutral),
        ],
    },
    Company {
        name: "HCL Technologies",
        aliases: &["hcl tech", "hcl technologies", "hcltech", "hcl"],
        nse: Some("HCLTECH"),
        bse: Some("532281"),
        sectors: &["IT"],
        close: dec!(1720.00),
        indicators: (61.0, 9.5, 1705.0, 1660.0, 28.0),
        pe_ratio: Some(27.2),
        eps: Some(57.9),
        beta: Some(0.68),
        sentiment: 0.2,
        headlines: &[("HCLTech software revenue grows double digits", Positive)],
    },
    Company {
        name: "Tech Mahindra",
        aliases: &["tech mahindra", "techm"],
        nse: Some("TECHM"),
        bse: Some("532755"),
        sectors: &["IT"],
        close: dec!(1650.00),
        indicators: (52.0, 3.1, 1641.0, 1622.0, 30.5),
        pe_ratio: Some(48.6),
        eps: Some(26.7),
        beta: Some(0.95),
        sentiment: 0.1,
        headlines: &[("Tech Mahindra margin recovery on track", Neutral)],
    },
    Company {
        name: "Reliance Industries",
        aliases: &["reliance", "reliance industries", "ril"],
        nse: Some("RELIANCE"),
        bse: Some("500325"),
        sectors: &["Energy"],
        close: dec!(2935.60),
        indicators: (49.7, -4.6, 2921.0, 2950.0, 41.0),
        pe_ratio: Some(27.8),
        eps: Some(102.9),
        beta: Some(0.98),
        sentiment: 0.1,
        headlines: &[("Reliance Jio tariff hike lifts ARPU estimates", Positive)],
    },
    Company {
        name: "ONGC",
        aliases: &["ongc", "oil and natural gas corporation"],
        nse: Some("ONGC"),
        bse: Some("500312"),
        sectors: &["Energy"],
        close: dec!(268.00),
        indicators: (46.0, -1.2, 266.0, 270.0, 6.1),
        pe_ratio: Some(7.8),
        eps: Some(34.3),
        beta: Some(1.0),
        sentiment: 0.0,
        headlines: &[],
    },
    Company {
        name: "NTPC",
        aliases: &["ntpc"],
        nse: Some("NTPC"),
        bse: Some("532555"),
        sectors: &["Energy"],
        close: dec!(358.00),
        indicators: (62.0, 3.0, 355.0, 345.0, 7.5),
        pe_ratio: Some(16.2),
        eps: Some(22.0),
        beta: Some(0.9),
        sentiment: 0.2,
        headlines: &[("NTPC commissions new renewable capacity", Positive)],
    },
    Company {
        name: "HDFC Bank",
        aliases: &["hdfc bank", "hdfc", "hdfcbank"],
        nse: Some("HDFCBANK"),
        bse: Some("500180"),
        sectors: &["Banking"],
        close: dec!(1642.15),
        indicators: (55.3, 6.8, 1630.0, 1598.0, 22.4),
        pe_ratio: Some(18.6),
        eps: Some(88.3),
        beta: Some(0.88),
        sentiment: 0.2,
        headlines: &[("HDFC Bank deposit growth beats estimates", Positive)],
    },
    Company {
        name: "ICICI Bank",
        aliases: &["icici bank", "icici", "icicibank"],
        nse: Some("ICICIBANK"),
        bse: Some("532174"),
        sectors: &["Banking"],
        close: dec!(1235.40),
        indicators: (66.8, 10.1, 1221.0, 1180.0, 19.8),
        pe_ratio: Some(18.9),
        eps: Some(65.4),
        beta: Some(1.05),
        sentiment: 0.3,
        headlines: &[("ICICI Bank asset quality improves again", Positive)],
    },
    Company {
        name: "State Bank of India",
        aliases: &["sbi", "state bank of india", "state bank", "sbin"],
        nse: Some("SBIN"),
        bse: Some("500112"),
        sectors: &["Banking"],
        close: dec!(812.70),
        indicators: (72.4, 5.3, 806.0, 781.0, 14.2),
        pe_ratio: Some(10.2),
        eps: Some(79.6),
        beta: Some(1.28),
        sentiment: 0.1,
        headlines: &[("SBI posts record quarterly profit", Positive)],
    },
    Company {
        name: "Axis Bank",
        aliases: &["axis bank", "axis", "axisbank"],
        nse: Some("AXISBANK"),
        bse: Some("532215"),
        sectors: &["Banking"],
        close: dec!(1138.90),
        indicators: (47.2, -3.4, 1135.0, 1149.0, 21.7),
        pe_ratio: Some(13.1),
        eps: Some(86.9),
        beta: Some(1.15),
        sentiment: 0.0,
        headlines: &[("Axis Bank card business under regulatory review", Neutral)],
    },
    Company {
        name: "Kotak Mahindra Bank",
        aliases: &["kotak mahindra bank", "kotak bank", "kotak"],
        nse: Some("KOTAKBANK"),
        bse: Some("500247"),
        sectors: &["Banking"],
        close: dec!(1765.00),
        indicators: (51.0, 2.0, 1760.0, 1748.0, 25.0),
        pe_ratio: Some(20.1),
        eps: Some(91.0),
        beta: Some(0.8),
        sentiment: 0.1,
        headlines: &[],
    },
    Company {
        name: "Bajaj Finance",
        aliases: &["bajaj finance", "bajfinance"],
        nse: Some("BAJFINANCE"),
        bse: Some("500034"),
        sectors: &["Financial Services"],
        close: dec!(6890.00),
        indicators: (56.0, 18.0, 6850.0, 6720.0, 140.0),
        pe_ratio: Some(29.6),
        eps: Some(232.8),
        beta: Some(1.35),
        sentiment: 0.1,
        headlines: &[("Bajaj Finance AUM crosses new milestone", Positive)],
    },
    Company {
        name: "One 97 Communications",
        aliases: &["paytm", "one 97", "one 97 communications"],
        nse: Some("PAYTM"),
        bse: Some("543396"),
        sectors: &["Fintech", "Financial Services"],
        close: dec!(735.00),
        indicators: (69.0, 12.0, 720.0, 655.0, 28.0),
        pe_ratio: None,
        eps: Some(-9.8),
        beta: Some(1.4),
        sentiment: -0.1,
        headlines: &[("Paytm narrows losses as payments volume recovers", Neutral)],
    },
    Company {
        name: "ITC",
        aliases: &["itc"],
        nse: Some("ITC"),
        bse: Some("500875"),
        sectors: &["FMCG"],
        close: dec!(468.25),
        indicators: (57.9, 2.1, 465.8, 459.3, 7.1),
        pe_ratio: Some(28.7),
        eps: Some(16.3),
        beta: Some(0.55),
        sentiment: 0.2,
        headlines: &[("ITC hotel demerger gets final approval", Positive)],
    },
    Company {
        name: "Hindustan Unilever",
        aliases: &["hindustan unilever", "hul", "hindunilvr"],
        nse: Some("HINDUNILVR"),
        bse: Some("500696"),
        sectors: &["FMCG"],
        close: dec!(2398.50),
        indicators: (41.3, -6.2, 2405.0, 2441.0, 33.9),
        pe_ratio: Some(55.2),
        eps: Some(43.5),
        beta: Some(0.48),
        sentiment: 0.0,
        headlines: &[("HUL volume growth stays muted in rural markets", Neutral)],
    },
    Company {
        name: "Nestle India",
        aliases: &["nestle india", "nestle"],
        nse: Some("NESTLEIND"),
        bse: Some("500790"),
        sectors: &["FMCG"],
        close: dec!(2480.00),
        indicators: (45.0, -2.0, 2475.0, 2490.0, 30.0),
        pe_ratio: Some(72.4),
        eps: Some(34.3),
        beta: Some(0.5),
        sentiment: 0.1,
        headlines: &[],
    },
    Company {
        name: "Vadilal Enterprises",
        aliases: &["vadilal enterprises", "vadilal"],
        nse: None,
        bse: Some("519152"),
        sectors: &["FMCG"],
        close: dec!(3540.00),
        indicators: (50.0, 1.0, 3530.0, 3500.0, 80.0),
        pe_ratio: Some(33.0),
        eps: Some(107.0),
        beta: Some(0.9),
        sentiment: 0.0,
        headlines: &[],
    },
    Company {
        name: "Larsen & Toubro",
        aliases: &["larsen & toubro", "larsen and toubro", "larsen", "l&t", "lt"],
        nse: Some("LT"),
        bse: Some("500510"),
        sectors: &["Infrastructure"],
        close: dec!(3612.00),
        indicators: (60.4, 14.7, 3590.0, 3502.0, 55.3),
        pe_ratio: Some(36.2),
        eps: Some(99.8),
        beta: Some(1.1),
        sentiment: 0.25,
        headlines: &[("L&T bags large order in Middle East", Positive)],
    },
    Company {
        name: "Adani Enterprises",
        aliases: &["adani enterprises", "adani", "adanient"],
        nse: Some("ADANIENT"),
        bse: Some("512599"),
        sectors: &["Infrastructure", "Metals & Mining"],
        close: dec!(2310.00),
        indicators: (74.5, -8.1, 2290.0, 2335.0, 96.4),
        pe_ratio: Some(88.7),
        eps: Some(26.0),
        beta: Some(1.62),
        sentiment: -0.3,
        headlines: &[
            ("Adani group stocks slide after fresh governance allegations", Negative),
            ("Adani Enterprises airport unit plans listing", Neutral),
        ],
    },
    Company {
        name: "Tata Motors",
        aliases: &["tata motors", "tatamotors", "tata motor"],
        nse: Some("TATAMOTORS"),
        bse: Some("500570"),
        sectors: &["Automobile", "EV"],
        close: dec!(985.60),
        indicators: (38.9, -11.3, 978.0, 1012.0, 24.6),
        pe_ratio: Some(8.9),
        eps: Some(110.7),
        beta: Some(1.55),
        sentiment: -0.2,
        headlines: &[
            ("JLR wholesale volumes fall in the quarter", Negative),
            ("Tata Motors EV bookings pick up", Positive),
        ],
    },
    Company {
        name: "Maruti Suzuki",
        aliases: &["maruti suzuki", "maruti"],
        nse: Some("MARUTI"),
        bse: Some("532500"),
        sectors: &["Automobile"],
        close: dec!(12450.00),
        indicators: (63.0, 45.0, 12380.0, 12110.0, 210.0),
        pe_ratio: Some(29.4),
        eps: Some(423.0),
        beta: Some(0.72),
        sentiment: 0.2,
        headlines: &[("Maruti Suzuki festive sales hit record", Positive)],
    },
    Company {
        name: "Mahindra & Mahindra",
        aliases: &["mahindra & mahindra", "mahindra and mahindra", "m&m", "mahindra"],
        nse: Some("M&M"),
        bse: Some("500520"),
        sectors: &["Automobile", "EV"],
        close: dec!(2890.00),
        indicators: (68.0, 20.0, 2860.0, 2750.0, 48.0),
        pe_ratio: Some(31.1),
        eps: Some(92.9),
        beta: Some(1.0),
        sentiment: 0.3,
        headlines: &[("Mahindra SUV demand remains strong", Positive)],
    },
    Company {
        name: "Ola Electric",
        aliases: &["ola electric", "ola", "olaelec"],
        nse: Some("OLAELEC"),
        bse: Some("544225"),
        sectors: &["EV"],
        close: dec!(68.40),
        indicators: (31.2, -3.9, 70.1, 82.6, 5.6),
        pe_ratio: None,
        eps: Some(-4.2),
        beta: Some(1.8),
        sentiment: -0.4,
        headlines: &[("Ola Electric market share drops amid service complaints", Negative)],
    },
    Company {
        name: "Sun Pharmaceutical",
        aliases: &["sun pharma", "sun pharmaceutical", "sunpharma"],
        nse: Some("SUNPHARMA"),
        bse: Some("524715"),
        sectors: &["Pharma"],
        close: dec!(1790.00),
        indicators: (59.0, 7.0, 1780.0, 1742.0, 27.0),
        pe_ratio: Some(38.5),
        eps: Some(46.5),
        beta: Some(0.6),
        sentiment: 0.2,
        headlines: &[("Sun Pharma specialty portfolio drives growth", Positive)],
    },
    Company {
        name: "Dr. Reddy's Laboratories",
        aliases: &[
            "dr. reddy's laboratories",
            "dr reddy's laboratories",
            "dr reddy's",
            "dr. reddy's",
            "dr reddys",
            "dr reddy",
            "drreddy",
        ],
        nse: Some("DRREDDY"),
        bse: Some("500124"),
        sectors: &["Pharma"],
        close: dec!(1265.00),
        indicators: (48.0, -1.5, 1262.0, 1270.0, 20.0),
        pe_ratio: Some(19.4),
        eps: Some(65.2),
        beta: Some(0.55),
        sentiment: 0.0,
        headlines: &[],
    },
    Company {
        name: "Cipla",
        aliases: &["cipla"],
        nse: Some("CIPLA"),
        bse: Some("500087"),
        sectors: &["Pharma"],
        close: dec!(1502.00),
        indicators: (53.0, 3.3, 1498.0, 1480.0, 24.0),
        pe_ratio: Some(24.8),
        eps: Some(60.5),
        beta: Some(0.58),
        sentiment: 0.1,
        headlines: &[],
    },
];

/// Canonical sector → names users call it by
const SECTOR_ALIASES: &[(&str, &[&str])] = &[
    ("IT", &["it", "tech", "technology", "software", "information technology"]),
    ("Banking", &["banking", "bank", "banks", "psu bank", "private bank"]),
    ("Financial Services", &["financial services", "finance", "nbfc"]),
    ("Fintech", &["fintech"]),
    ("Pharma", &["pharma", "pharmaceutical", "pharmaceuticals", "healthcare"]),
    ("Automobile", &["automobile", "automobiles", "auto", "automotive"]),
    ("EV", &["ev", "electric vehicle", "electric vehicles"]),
    ("FMCG", &["fmcg", "consumer", "consumer goods"]),
    ("Energy", &["energy", "oil and gas", "oil & gas", "power"]),
    ("Infrastructure", &["infrastructure", "infra", "capital goods"]),
    ("Metals & Mining", &["metals", "metals & mining", "mining"]),
];

/// Static MCX quotes: (symbol, current, previous close, 30d high, 30d low)
const COMMODITY_QUOTES: &[(&str, Decimal, Decimal, Decimal, Decimal)] = &[
    ("GOLD", dec!(76250), dec!(75980), dec!(77400), dec!(73900)),
    ("SILVER", dec!(91200), dec!(92050), dec!(95800), dec!(88100)),
    ("CRUDEOIL", dec!(5890), dec!(5965), dec!(6320), dec!(5710)),
    ("NATGAS", dec!(238.40), dec!(231.10), dec!(262.00), dec!(214.50)),
    ("COPPER", dec!(812.35), dec!(808.90), dec!(845.00), dec!(786.20)),
    ("ALUMINIUM", dec!(236.80), dec!(237.40), dec!(244.10), dec!(226.50)),
    ("ZINC", dec!(278.15), dec!(275.60), dec!(289.70), dec!(262.30)),
    ("LEAD", dec!(184.20), dec!(184.90), dec!(188.40), dec!(179.60)),
    ("NICKEL", dec!(1385.00), dec!(1372.50), dec!(1440.00), dec!(1320.00)),
    ("COTTON", dec!(56800), dec!(56500), dec!(58200), dec!(55100)),
];

/// Drop corporate suffixes and collapse whitespace
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .filter(|w| !matches!(w.trim_end_matches('.'), "ltd" | "limited" | "pvt" | "private" | "inc" | "corp"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonical_sector(sector: &str) -> Option<&'static str> {
    let key = sector
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !matches!(*w, "sector" | "stocks" | "industry" | "companies"))
        .collect::<Vec<_>>()
        .join(" ");

    SECTOR_ALIASES
        .iter()
        .find(|(canonical, aliases)| canonical.eq_ignore_ascii_case(&key) || aliases.contains(&key.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Mock market data source with static values
#[derive(Default)]
pub struct MockMarketData {
    /// Ticker whose price lookups fail (for testing)
    failing_ticker: Option<String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage for one ticker
    #[must_use]
    pub fn with_failing_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.failing_ticker = Some(ticker.into());
        self
    }

    fn company(name: &str) -> Option<&'static Company> {
        let key = normalize_name(name);
        UNIVERSE.iter().find(|c| c.aliases.contains(&key.as_str()))
    }

    fn by_ticker(ticker: &str) -> Option<&'static Company> {
        UNIVERSE
            .iter()
            .find(|c| c.ticker().is_some_and(|t| t.eq_ignore_ascii_case(ticker)))
    }

    fn check_outage(&self, ticker: &str) -> Result<()> {
        match &self.failing_ticker {
            Some(failing) if failing.eq_ignore_ascii_case(ticker) => Err(AdvisorError::Provider(
                format!("Upstream timeout while fetching {ticker}"),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn resolve_ticker(&self, company: &str) -> Result<Option<Listing>> {
        Ok(Self::company(company).map(Company::listing))
    }

    async fn price_data(&self, ticker: &str) -> Result<PriceData> {
        self.check_outage(ticker)?;
        Self::by_ticker(ticker)
            .map(Company::price_data)
            .ok_or_else(|| AdvisorError::Provider(format!("No price data for {ticker}")))
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        self.check_outage(ticker)?;
        let company = Self::by_ticker(ticker)
            .ok_or_else(|| AdvisorError::Provider(format!("No fundamentals for {ticker}")))?;

        Ok(Fundamentals {
            pe_ratio: company.pe_ratio,
            eps: company.eps,
            beta: company.beta,
            sector: company.sectors.first().map(|s| (*s).to_string()),
        })
    }

    async fn sentiment(&self, company: &str) -> Result<Sentiment> {
        let Some(company) = Self::company(company) else {
            return Ok(Sentiment::neutral());
        };

        Ok(Sentiment {
            score: company.sentiment,
            articles: company
                .headlines
                .iter()
                .map(|(title, sentiment)| Headline {
                    source: "Economic Times".into(),
                    title: (*title).to_string(),
                    sentiment: *sentiment,
                })
                .collect(),
        })
    }

    async fn social_news(&self, company: &str) -> Result<Vec<SocialPost>> {
        let Some(company) = Self::company(company) else {
            return Ok(Vec::new());
        };

        let posts = company
            .headlines
            .iter()
            .enumerate()
            .map(|(i, (title, _))| {
                if i % 2 == 0 {
                    SocialPost {
                        source: "Reddit".into(),
                        title: (*title).to_string(),
                        content: format!("Thoughts on this for {} holders?", company.name),
                        community: "r/IndianStockMarket".into(),
                    }
                } else {
                    SocialPost {
                        source: "Twitter".into(),
                        title: (*title).to_string(),
                        content: format!("{title} #{}", company.nse.unwrap_or(company.name)),
                        community: "X / Twitter".into(),
                    }
                }
            })
            .collect();
        Ok(posts)
    }

    async fn competitors(&self, company: &str) -> Result<Vec<String>> {
        let Some(base) = Self::company(company) else {
            return Ok(Vec::new());
        };
        let Some(sector) = base.sectors.first() else {
            return Ok(Vec::new());
        };

        Ok(UNIVERSE
            .iter()
            .filter(|c| c.name != base.name && c.sectors.contains(sector))
            .map(|c| c.name.to_string())
            .take(5)
            .collect())
    }

    async fn sector_stocks(&self, sector: &str) -> Result<Vec<String>> {
        let Some(sector) = canonical_sector(sector) else {
            return Ok(Vec::new());
        };

        Ok(UNIVERSE
            .iter()
            .filter(|c| c.sectors.contains(&sector))
            .map(|c| c.name.to_string())
            .collect())
    }

    async fn commodity_quote(&self, symbol: &str) -> Result<CommodityQuote> {
        let (symbol, current, prev, high, low) = COMMODITY_QUOTES
            .iter()
            .find(|(s, ..)| s.eq_ignore_ascii_case(symbol))
            .copied()
            .ok_or_else(|| AdvisorError::UnsupportedCommodity(symbol.to_string()))?;

        let change = ((current - prev) / prev * dec!(100)).round_dp(2);

        Ok(CommodityQuote {
            symbol: symbol.to_string(),
            current_price: current,
            prev_close: prev,
            daily_change_pct: change,
            last_30d_high: high,
            last_30d_low: low,
            as_of: Utc::now(),
        })
    }

    async fn health_check(&self) -> bool {
        true // Mock always healthy
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ticker() {
        let market = MockMarketData::new();

        let tcs = market.resolve_ticker("TCS").await.unwrap().unwrap();
        assert_eq!(tcs.preferred_ticker().as_deref(), Some("TCS.NS"));

        let infy = market.resolve_ticker("Infosys Ltd.").await.unwrap().unwrap();
        assert_eq!(infy.preferred_ticker().as_deref(), Some("INFY.NS"));

        let vadilal = market.resolve_ticker("Vadilal Enterprises").await.unwrap().unwrap();
        assert_eq!(vadilal.preferred_ticker().as_deref(), Some("519152.BO"));

        assert!(market.resolve_ticker("Acme Widgets").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_every_company_resolves_by_name() {
        let market = MockMarketData::new();
        for company in UNIVERSE {
            let listing = market.resolve_ticker(company.name).await.unwrap();
            assert!(listing.is_some(), "{}", company.name);
        }
    }

    #[tokio::test]
    async fn test_watchlist_is_covered() {
        let market = MockMarketData::new();
        for ticker in market.screener_watchlist() {
            assert!(market.price_data(&ticker).await.is_ok(), "{ticker}");
            assert!(market.fundamentals(&ticker).await.is_ok(), "{ticker}");
        }
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_provider_error() {
        let market = MockMarketData::new();
        let err = market.price_data("NOTREAL.NS").await.unwrap_err();
        assert_eq!(err.to_string(), "Market data error: No price data for NOTREAL.NS");
    }

    #[tokio::test]
    async fn test_failing_ticker() {
        let market = MockMarketData::new().with_failing_ticker("INFY.NS");
        assert!(market.price_data("INFY.NS").await.is_err());
        assert!(market.price_data("TCS.NS").await.is_ok());
    }

    #[tokio::test]
    async fn test_sectors_and_competitors() {
        let market = MockMarketData::new();

        let it = market.sector_stocks("IT sector").await.unwrap();
        assert!(it.contains(&"Infosys".to_string()));
        assert_eq!(it.len(), 5);

        let ev = market.sector_stocks("electric vehicles").await.unwrap();
        assert!(ev.contains(&"Tata Motors".to_string()));
        assert!(market.sector_stocks("space tourism").await.unwrap().is_empty());

        let peers = market.competitors("TCS").await.unwrap();
        assert!(peers.contains(&"Infosys".to_string()));
        assert!(!peers.contains(&"Tata Consultancy Services".to_string()));
        assert!(market.competitors("Acme Widgets").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commodity_quote() {
        let market = MockMarketData::new();
        let gold = market.commodity_quote("GOLD").await.unwrap();
        assert_eq!(gold.current_price, dec!(76250));
        assert_eq!(gold.daily_change_pct, dec!(0.36));

        let err = market.commodity_quote("JEERA").await.unwrap_err();
        assert!(matches!(err, AdvisorError::UnsupportedCommodity(_)));
    }

    #[tokio::test]
    async fn test_sentiment() {
        let market = MockMarketData::new();
        assert!(market.sentiment("Wipro").await.unwrap().has_negative_headline());
        assert_eq!(market.sentiment("Acme Widgets").await.unwrap(), Sentiment::neutral());
        assert_eq!(market.social_news("Wipro").await.unwrap()[1].source, "Twitter");
    }
}
