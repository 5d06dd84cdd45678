use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// -----------------------------------------------
// YAHOO FINANCE API ENDPOINTS
// -----------------------------------------------
pub const YAHOO_BASE_URL: &str = "https://finance.yahoo.com";
pub const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const YAHOO_OPTIONS_BASE: &str = "https://query2.finance.yahoo.com/v7/finance/options";
pub const YAHOO_SEARCH_BASE: &str = "https://query1.finance.yahoo.com/v1/finance/search";
pub const YAHOO_SUMMARY_BASE: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

pub fn chart_url(symbol: &str, range: &str) -> String {
    format!(
        "{}/{}?range={}&interval=1d",
        YAHOO_CHART_BASE,
        urlencoding::encode(symbol), // index symbols like ^VIX need encoding
        range
    )
}

pub fn options_url(symbol: &str, expiration: Option<i64>) -> String {
    match expiration {
        Some(epoch) => format!(
            "{}/{}?date={}",
            YAHOO_OPTIONS_BASE,
            urlencoding::encode(symbol),
            epoch
        ),
        None => format!("{}/{}", YAHOO_OPTIONS_BASE, urlencoding::encode(symbol)),
    }
}

pub fn news_search_url(symbol: &str, count: usize) -> String {
    format!(
        "{}?q={}&newsCount={}&quotesCount=0",
        YAHOO_SEARCH_BASE,
        urlencoding::encode(symbol),
        count
    )
}

pub fn calendar_events_url(symbol: &str) -> String {
    format!(
        "{}/{}?modules=calendarEvents",
        YAHOO_SUMMARY_BASE,
        urlencoding::encode(symbol)
    )
}

// -----------------------------------------------
// TICKER UNIVERSE
// -----------------------------------------------
pub const DOW_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "JPM", "V", "UNH", "HD", "PG", "JNJ", "CVX", "MRK",
    "DIS", "CSCO", "CRM", "NKE", "KO", "MCD", "WMT", "IBM", "CAT", "GS",
    "TRV", "AXP", "BA", "MMM", "AMGN", "HON", "VZ", "DOW", "INTC", "WBA",
];

pub const SP500_TOP50_TICKERS: &[&str] = &[
    "NVDA", "MSFT", "AAPL", "AMZN", "META", "AVGO", "GOOGL", "GOOG", "TSLA",
    "BRK-B", "WMT", "ORCL", "JPM", "LLY", "V", "NFLX", "MA", "XOM", "JNJ",
    "PLTR", "COST", "ABBV", "HD", "AMD", "BAC", "PG", "UNH", "CVX", "PFE",
    "DIS", "KO", "CSCO", "MCD", "INTC", "T", "PEP", "WBA", "MMM", "GE",
    "BMY", "MDT", "C", "GS", "AXP", "NEE", "TMO", "RTX", "LMT", "AMGN", "UNP",
];

/// Combined screening universe, Dow names first, deduplicated in order.
pub fn screen_universe() -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    DOW_TICKERS
        .iter()
        .chain(SP500_TOP50_TICKERS.iter())
        .filter(|s| seen.insert(**s))
        .map(|s| s.to_string())
        .collect()
}

// -----------------------------------------------
// MARKET INDICES FOR THE CHECKLIST
// -----------------------------------------------
pub const MARKET_INDICES: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^IXIC", "NASDAQ"),
    ("^DJI", "Dow Jones"),
    ("^VIX", "VIX (Volatility)"),
];

pub const VIX_SYMBOL: &str = "^VIX";
pub const SP500_NAME: &str = "S&P 500";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-CA,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 3;
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
pub const RETRY_MAX_ATTEMPTS: usize = 5;

// -----------------------------------------------
// CONCURRENCY LIMITS
// -----------------------------------------------
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://finance.yahoo.com/";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// CONTRACT TERMS
// -----------------------------------------------
/// US equity options cover 100 shares per contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

// -----------------------------------------------
// CHECKLIST SCAN LIMITS
// -----------------------------------------------
pub const NEWS_SCAN_SYMBOLS: usize = 10;
pub const NEWS_MAX_ARTICLES: usize = 3;
pub const NEWS_MAX_AGE_DAYS: i64 = 3;
pub const TECHNICAL_SAMPLE_SIZE: usize = 3;

// -----------------------------------------------
// SCREENING CRITERIA DEFAULTS
// -----------------------------------------------
pub const DEFAULT_MIN_OTM_PERCENT: f64 = 15.0;
pub const DEFAULT_MAX_OTM_PERCENT: f64 = 25.0;
pub const DEFAULT_MIN_DTE: i64 = 7;
pub const DEFAULT_MAX_DTE: i64 = 28;
pub const DEFAULT_SPREAD_WIDTH: f64 = 5.00;
pub const DEFAULT_MIN_RETURN_ON_RISK: f64 = 20.0;
pub const DEFAULT_MIN_VOLUME: u64 = 10;
pub const DEFAULT_MIN_OPEN_INTEREST: u64 = 50;

/// Screening thresholds, loaded once at startup and never mutated.
///
/// Defaults come from the constants above; every field can be overridden
/// with a `SCREENER_*` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenCriteria {
    /// Short strike must be at least this far out of the money (percent).
    pub min_otm_percent: f64,
    /// Short strike must be at most this far out of the money (percent).
    pub max_otm_percent: f64,
    /// Minimum calendar days to expiration (inclusive).
    pub min_dte: i64,
    /// Maximum calendar days to expiration (inclusive).
    pub max_dte: i64,
    /// Exact distance between short and long strikes.
    pub spread_width: f64,
    /// Minimum credit / max-risk ratio, as a percent.
    pub min_return_on_risk: f64,
    /// Minimum contract volume for a quote to count as liquid.
    pub min_volume: u64,
    /// Minimum open interest for a quote to count as liquid.
    pub min_open_interest: u64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            min_otm_percent: DEFAULT_MIN_OTM_PERCENT,
            max_otm_percent: DEFAULT_MAX_OTM_PERCENT,
            min_dte: DEFAULT_MIN_DTE,
            max_dte: DEFAULT_MAX_DTE,
            spread_width: DEFAULT_SPREAD_WIDTH,
            min_return_on_risk: DEFAULT_MIN_RETURN_ON_RISK,
            min_volume: DEFAULT_MIN_VOLUME,
            min_open_interest: DEFAULT_MIN_OPEN_INTEREST,
        }
    }
}

impl ScreenCriteria {
    /// Build criteria from defaults plus `SCREENER_*` environment overrides.
    pub fn from_env() -> Self {
        Self {
            min_otm_percent: env_f64("SCREENER_MIN_OTM_PERCENT", DEFAULT_MIN_OTM_PERCENT),
            max_otm_percent: env_f64("SCREENER_MAX_OTM_PERCENT", DEFAULT_MAX_OTM_PERCENT),
            min_dte: env_i64("SCREENER_MIN_DTE", DEFAULT_MIN_DTE),
            max_dte: env_i64("SCREENER_MAX_DTE", DEFAULT_MAX_DTE),
            spread_width: env_f64("SCREENER_SPREAD_WIDTH", DEFAULT_SPREAD_WIDTH),
            min_return_on_risk: env_f64("SCREENER_MIN_RETURN_ON_RISK", DEFAULT_MIN_RETURN_ON_RISK),
            min_volume: env_u64("SCREENER_MIN_VOLUME", DEFAULT_MIN_VOLUME),
            min_open_interest: env_u64("SCREENER_MIN_OPEN_INTEREST", DEFAULT_MIN_OPEN_INTEREST),
        }
    }

    /// Reject inconsistent thresholds before any data is fetched.
    pub fn validate(&self) -> Result<()> {
        if self.min_otm_percent < 0.0 || self.max_otm_percent < 0.0 {
            bail!("OTM bounds must be non-negative");
        }
        if self.min_otm_percent > self.max_otm_percent {
            bail!(
                "min OTM percent ({}) exceeds max OTM percent ({})",
                self.min_otm_percent,
                self.max_otm_percent
            );
        }
        if self.min_dte < 0 {
            bail!("min DTE must be non-negative, got {}", self.min_dte);
        }
        if self.min_dte > self.max_dte {
            bail!("min DTE ({}) exceeds max DTE ({})", self.min_dte, self.max_dte);
        }
        if self.spread_width <= 0.0 {
            bail!("spread width must be positive, got {}", self.spread_width);
        }
        if self.min_return_on_risk < 0.0 {
            bail!(
                "min return on risk must be non-negative, got {}",
                self.min_return_on_risk
            );
        }
        Ok(())
    }
}

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to screen
pub fn get_execution_mode() -> String {
    std::env::var("SCREENER_MODE").unwrap_or_else(|_| "screen".to_string())
}

/// Get fetch concurrency, overridable via environment
pub fn get_max_concurrent() -> usize {
    if let Ok(val) = std::env::var("SCREENER_MAX_CONCURRENT") {
        if let Ok(num) = val.parse::<usize>() {
            return num.clamp(1, 50);
        }
    }
    DEFAULT_MAX_CONCURRENT
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
