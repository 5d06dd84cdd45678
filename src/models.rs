use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OptionType {
    Put,
    Call,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Put => "PUT",
            OptionType::Call => "CALL",
        }
    }
}

/// One option quote as delivered by the market data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionContract {
    pub strike: f64,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last_price: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
}

/// Full option chain for one underlying, all in-window expirations flattened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub symbol: String,
    pub underlying_price: f64,
    pub timestamp: DateTime<Utc>,
    pub contracts: Vec<OptionContract>,
}

/// Daily close/high/low series for one symbol, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl PriceHistory {
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    pub fn previous_close(&self) -> Option<f64> {
        if self.closes.len() > 1 {
            Some(self.closes[self.closes.len() - 2])
        } else {
            self.closes.last().copied()
        }
    }
}

// -----------------------------------------------
// YAHOO OPTIONS API (v7) WIRE FORMAT
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsResponse {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionChainEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainEnvelope {
    pub result: Vec<OptionChainResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResult {
    #[serde(rename = "underlyingSymbol")]
    pub underlying_symbol: String,

    #[serde(rename = "expirationDates", default)]
    pub expiration_dates: Vec<i64>,

    pub quote: UnderlyingQuote,

    #[serde(default)]
    pub options: Vec<ExpirationSlice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnderlyingQuote {
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: f64,
}

/// One expiration's worth of quotes.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpirationSlice {
    #[serde(rename = "expirationDate")]
    pub expiration_date: i64,

    #[serde(default)]
    pub calls: Vec<WireContract>,

    #[serde(default)]
    pub puts: Vec<WireContract>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireContract {
    pub strike: f64,

    pub bid: Option<f64>,
    pub ask: Option<f64>,

    #[serde(rename = "lastPrice")]
    pub last_price: Option<f64>,

    pub volume: Option<u64>,

    #[serde(rename = "openInterest")]
    pub open_interest: Option<u64>,

    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<f64>,
}

impl WireContract {
    pub fn into_contract(self, expiration: NaiveDate, option_type: OptionType) -> OptionContract {
        OptionContract {
            strike: self.strike,
            expiration,
            option_type,
            bid: self.bid,
            ask: self.ask,
            last_price: self.last_price,
            volume: self.volume,
            open_interest: self.open_interest,
            implied_volatility: self.implied_volatility,
        }
    }
}

// -----------------------------------------------
// YAHOO CHART API (v8) WIRE FORMAT
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Vec<ChartResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    pub quote: Vec<ChartQuote>,
}

/// Bars with no trades come through as nulls; keep them optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,

    #[serde(default)]
    pub high: Vec<Option<f64>>,

    #[serde(default)]
    pub low: Vec<Option<f64>>,
}

// -----------------------------------------------
// YAHOO SEARCH API (v1) WIRE FORMAT
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news: Vec<WireNews>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNews {
    pub title: String,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(rename = "providerPublishTime")]
    pub provider_publish_time: Option<i64>,

    #[serde(default)]
    pub link: Option<String>,
}

// -----------------------------------------------
// YAHOO QUOTE SUMMARY API (v10) WIRE FORMAT
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(rename = "calendarEvents")]
    pub calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvents {
    pub earnings: Option<EarningsCalendar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EarningsCalendar {
    #[serde(rename = "earningsDate", default)]
    pub earnings_date: Vec<EpochValue>,
}

/// Yahoo wraps numeric fields as {"raw": ..., "fmt": ...}.
#[derive(Debug, Clone, Deserialize)]
pub struct EpochValue {
    pub raw: Option<i64>,
}
