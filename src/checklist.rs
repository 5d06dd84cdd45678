use crate::config;
use crate::models::PriceHistory;
use crate::news::NewsItem;
use crate::provider::QuoteProvider;
use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

// Decision thresholds
const VIX_WAIT_LEVEL: f64 = 25.0;
const NEGATIVE_CATALYST_LIMIT: usize = 5;
const SP500_SELLOFF_PERCENT: f64 = -1.5;

const FOMC_REMINDER: &str = "Check FOMC calendar for interest rate decisions";

/// Last close and day-over-day move for one market index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub name: String,
    pub price: f64,
    pub change_percent: f64,
}

impl IndexSnapshot {
    pub fn from_history(name: &str, history: &PriceHistory) -> Option<Self> {
        let current = history.last_close()?;
        let previous = history.previous_close()?;
        let change_percent = if previous != 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        };
        Some(Self {
            name: name.to_string(),
            price: current,
            change_percent,
        })
    }

    pub fn trend_label(&self) -> &'static str {
        if self.change_percent > 0.0 {
            "UP"
        } else if self.change_percent < 0.0 {
            "DOWN"
        } else {
            "FLAT"
        }
    }
}

/// VIX reading mapped onto static cutoffs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VixAssessment {
    pub current: f64,
    pub previous: f64,
    pub level: String,
    pub guidance: String,
    pub rising: bool,
}

/// Classify the VIX close: < 15 LOW, < 20 NORMAL, < 30 ELEVATED, else HIGH.
pub fn assess_vix(current: f64, previous: f64) -> VixAssessment {
    let (level, guidance) = if current < 15.0 {
        ("LOW (Complacent)", "Low volatility - Good for selling premium")
    } else if current < 20.0 {
        ("NORMAL", "Normal conditions - Standard strategies OK")
    } else if current < 30.0 {
        ("ELEVATED", "Higher volatility - Use caution")
    } else {
        ("HIGH (Fear)", "High volatility - Avoid selling puts or use wider strikes")
    };

    VixAssessment {
        current,
        previous,
        level: level.to_string(),
        guidance: guidance.to_string(),
        rising: current > previous,
    }
}

/// Calendar heuristics for scheduled economic releases. Always ends with the
/// standing FOMC reminder.
pub fn economic_events(today: NaiveDate) -> Vec<String> {
    let mut events = Vec::new();

    if today.weekday() == Weekday::Fri {
        events.push("Check for: Jobs Report (first Friday of month)".to_string());
        if today.day() <= 7 {
            events.push("LIKELY: Monthly Jobs Report".to_string());
        }
    }
    if (10..=15).contains(&today.day()) {
        events.push("Check for: CPI/PPI Inflation Data (mid-month)".to_string());
    }

    events.push(FOMC_REMINDER.to_string());
    events
}

/// Support/resistance derived from the 30-day range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalLevels {
    pub current_price: f64,
    pub support: f64,
    pub resistance: f64,
    pub distance_from_low: f64,
    pub distance_from_high: f64,
}

pub fn technical_levels(history: &PriceHistory) -> Option<TechnicalLevels> {
    let current_price = history.last_close()?;
    let resistance = history.highs.iter().copied().fold(f64::MIN, f64::max);
    let support = history.lows.iter().copied().fold(f64::MAX, f64::min);
    if history.highs.is_empty() || history.lows.is_empty() {
        return None;
    }

    Some(TechnicalLevels {
        current_price,
        support,
        resistance,
        distance_from_low: (current_price - support) / support * 100.0,
        distance_from_high: (resistance - current_price) / resistance * 100.0,
    })
}

/// Flag earnings landing inside the next week.
pub fn earnings_alert(next_earnings: Option<NaiveDate>, today: NaiveDate) -> Option<String> {
    let date = next_earnings?;
    let days_until = (date - today).num_days();
    if (0..=7).contains(&days_until) {
        Some(format!("EARNINGS IN {} DAYS", days_until))
    } else {
        None
    }
}

/// A headline worth acting on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalyst {
    pub symbol: String,
    pub title: String,
    pub categories: String,
}

impl Catalyst {
    pub fn from_news(item: &NewsItem) -> Self {
        Self {
            symbol: item.symbol.clone(),
            title: item.title.clone(),
            categories: item.categories.join(", "),
        }
    }
}

/// Technical section entry for one watchlist symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTechnicals {
    pub symbol: String,
    pub levels: TechnicalLevels,
    pub earnings_alert: Option<String>,
}

/// The go/no-go summary at the bottom of the checklist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingDecision {
    pub futures_check: String,
    pub econ_check: String,
    pub news_check: String,
    pub technical_check: String,
    pub action: String,
    pub next_steps: String,
}

/// Decision ladder: elevated VIX first, then a pile-up of negative
/// catalysts, then a broad selloff; otherwise conditions are workable.
pub fn decide(sp500_change: f64, vix_level: f64, negative_count: usize) -> TradingDecision {
    let (action, next_steps) = if vix_level > VIX_WAIT_LEVEL {
        (
            "WAIT - VIX too high, volatility elevated",
            "• Skip today or use very conservative strikes (25%+ OTM)\n• Consider waiting for VIX to settle",
        )
    } else if negative_count > NEGATIVE_CATALYST_LIMIT {
        (
            "CAUTION - Multiple negative catalysts present",
            "• Focus on stocks WITHOUT negative news\n• Use wider strikes and smaller position sizes",
        )
    } else if sp500_change < SP500_SELLOFF_PERCENT {
        (
            "WAIT - Market selling off, avoid new trades",
            "• Wait for market stabilization\n• Review existing positions only",
        )
    } else {
        (
            "ENTER TRADE - Market conditions favorable",
            "• Run the options screener\n• Select 2-3 CSP and 1 BPS from results\n• Execute trades with proper position sizing",
        )
    };

    TradingDecision {
        futures_check: format!(
            "Market {} ({:+.2}%), VIX at {:.1}",
            if sp500_change > 0.0 { "UP" } else { "DOWN" },
            sp500_change,
            vix_level
        ),
        econ_check: "See economic calendar section above".to_string(),
        news_check: format!("{} negative catalysts detected", negative_count),
        technical_check: "Support/resistance levels identified above".to_string(),
        action: action.to_string(),
        next_steps: next_steps.to_string(),
    }
}

/// Everything the renderer needs, already fetched and classified.
#[derive(Debug, Clone)]
pub struct ChecklistData {
    pub generated_at: String,
    pub indices: Vec<IndexSnapshot>,
    pub vix: VixAssessment,
    pub events: Vec<String>,
    pub negative_catalysts: Vec<Catalyst>,
    pub positive_catalysts: Vec<Catalyst>,
    pub technicals: Vec<SymbolTechnicals>,
}

/// Fetch and classify everything the checklist needs. Each fetch failure is
/// non-fatal; the affected section just comes up short.
pub async fn gather_checklist_data(provider: &impl QuoteProvider) -> ChecklistData {
    let today = Local::now().date_naive();

    // Step 1 inputs: index snapshots and the VIX reading
    let mut indices = Vec::new();
    let mut vix = VixAssessment {
        current: 0.0,
        previous: 0.0,
        level: "UNKNOWN".to_string(),
        guidance: "Unable to fetch VIX data".to_string(),
        rising: false,
    };

    for (symbol, name) in config::MARKET_INDICES {
        match provider.history(symbol, "5d").await {
            Ok(history) => {
                if *symbol == config::VIX_SYMBOL {
                    if let (Some(current), Some(previous)) =
                        (history.last_close(), history.previous_close())
                    {
                        vix = assess_vix(current, previous);
                    }
                }
                if let Some(snapshot) = IndexSnapshot::from_history(name, &history) {
                    indices.push(snapshot);
                }
            }
            Err(e) => warn!(symbol, error = %e, "failed to fetch index history"),
        }
    }

    // Step 3 inputs: recent headlines split into catalysts
    let mut stocks_with_news = Vec::new();
    let mut negative_catalysts = Vec::new();
    let mut positive_catalysts = Vec::new();

    for symbol in config::DOW_TICKERS.iter().take(config::NEWS_SCAN_SYMBOLS) {
        let items = match provider.stock_news(symbol, config::NEWS_MAX_ARTICLES).await {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol, error = %e, "failed to fetch news");
                continue;
            }
        };

        let mut significant = false;
        for item in &items {
            if item.days_ago <= config::NEWS_MAX_AGE_DAYS {
                significant = true;
                if item.sentiment.is_negative() {
                    negative_catalysts.push(Catalyst::from_news(item));
                } else if item.sentiment.is_positive() {
                    positive_catalysts.push(Catalyst::from_news(item));
                }
            }
        }
        if significant {
            stocks_with_news.push(symbol.to_string());
        }
    }

    // Step 4 inputs: technicals for the stocks in the news, or a fixed
    // sample when the tape is quiet
    let sample: Vec<String> = if stocks_with_news.is_empty() {
        config::DOW_TICKERS
            .iter()
            .take(config::TECHNICAL_SAMPLE_SIZE)
            .map(|s| s.to_string())
            .collect()
    } else {
        stocks_with_news
            .iter()
            .take(config::TECHNICAL_SAMPLE_SIZE)
            .cloned()
            .collect()
    };

    let mut technicals = Vec::new();
    for symbol in &sample {
        match provider.history(symbol, "1mo").await {
            Ok(history) => {
                if let Some(levels) = technical_levels(&history) {
                    let next_earnings = match provider.next_earnings(symbol).await {
                        Ok(date) => date,
                        Err(e) => {
                            warn!(symbol, error = %e, "failed to fetch earnings date");
                            None
                        }
                    };
                    technicals.push(SymbolTechnicals {
                        symbol: symbol.clone(),
                        levels,
                        earnings_alert: earnings_alert(next_earnings, today),
                    });
                }
            }
            Err(e) => warn!(symbol, error = %e, "failed to fetch price history"),
        }
    }

    ChecklistData {
        generated_at: Local::now().format("%A, %B %d, %Y at %I:%M %p").to_string(),
        indices,
        vix,
        events: economic_events(today),
        negative_catalysts,
        positive_catalysts,
        technicals,
    }
}

/// Render the daily checklist as plain text. Kept free of ANSI color so the
/// same string can be exported to a file unchanged.
pub fn render_checklist(data: &ChecklistData) -> String {
    let wide = "=".repeat(100);
    let thin = "-".repeat(100);
    let mut report = Vec::new();

    report.push(wide.clone());
    report.push("DAILY OPTIONS TRADING CHECKLIST".to_string());
    report.push(wide.clone());
    report.push(format!("Date: {}", data.generated_at));
    report.push(wide.clone());

    // Step 1: macro and market overview
    report.push(String::new());
    report.push("STEP 1: MACRO & MARKET OVERVIEW (Before 8:30 AM ET)".to_string());
    report.push(thin.clone());
    report.push(String::new());
    report.push("Market Indices:".to_string());
    for snapshot in &data.indices {
        report.push(format!(
            "   • {}: {:.2} ({:+.2}%) {}",
            snapshot.name,
            snapshot.price,
            snapshot.change_percent,
            snapshot.trend_label()
        ));
    }

    report.push(String::new());
    report.push("VIX Volatility Index:".to_string());
    report.push(format!("   • Current: {:.2} - {}", data.vix.current, data.vix.level));
    report.push(format!("   • Assessment: {}", data.vix.guidance));
    if data.vix.rising {
        report.push("   • VIX is RISING - Exercise caution with new positions".to_string());
    }
    report.push(String::new());
    report.push("Why It Matters:".to_string());
    report.push(
        "   Tells you if the day is risk-on or risk-off - avoid selling puts when volatility spikes"
            .to_string(),
    );

    // Step 2: economic data
    report.push(String::new());
    report.push(String::new());
    report.push("STEP 2: ECONOMIC DATA RELEASE CHECK (8:30 AM ET)".to_string());
    report.push(thin.clone());
    report.push(String::new());
    report.push("Today's Economic Events:".to_string());
    for event in &data.events {
        report.push(format!("   • {}", event));
    }
    report.push(String::new());
    report.push("Why It Matters:".to_string());
    report.push("   Avoid new trades right before big data drops (implied volatility risk)".to_string());

    // Step 3: news scan
    report.push(String::new());
    report.push(String::new());
    report.push("STEP 3: NEWS SCAN - STOCK & SECTOR (8:45-9:15 AM ET)".to_string());
    report.push(thin.clone());

    if !data.negative_catalysts.is_empty() {
        report.push(String::new());
        report.push("NEGATIVE CATALYSTS (Avoid or Use Caution):".to_string());
        for item in data.negative_catalysts.iter().take(5) {
            report.push(format!("   • [{}] {}", item.symbol, item.title));
            report.push(format!("     Categories: {}", item.categories));
        }
    }
    if !data.positive_catalysts.is_empty() {
        report.push(String::new());
        report.push("POSITIVE CATALYSTS (Potential Opportunities):".to_string());
        for item in data.positive_catalysts.iter().take(5) {
            report.push(format!("   • [{}] {}", item.symbol, item.title));
            report.push(format!("     Categories: {}", item.categories));
        }
    }
    if data.negative_catalysts.is_empty() && data.positive_catalysts.is_empty() {
        report.push(String::new());
        report.push("   No major catalysts detected in recent news".to_string());
    }
    report.push(String::new());
    report.push("Why It Matters:".to_string());
    report.push("   Identifies sudden catalysts that can move your stock".to_string());

    // Step 4: technicals
    report.push(String::new());
    report.push(String::new());
    report.push("STEP 4: TECHNICAL & VOLATILITY SETUP (9:15-9:25 AM ET)".to_string());
    report.push(thin.clone());
    report.push(String::new());
    report.push("Key Support/Resistance Levels:".to_string());
    for entry in &data.technicals {
        report.push(format!("   • {}: ${:.2}", entry.symbol, entry.levels.current_price));
        report.push(format!(
            "     Support: ${:.2} | Resistance: ${:.2}",
            entry.levels.support, entry.levels.resistance
        ));
        if let Some(alert) = &entry.earnings_alert {
            report.push(format!("     {}", alert));
        }
    }
    report.push(String::new());
    report.push("Why It Matters:".to_string());
    report.push("   Ensures you sell puts below strong support with enough premium".to_string());

    // Step 5: decision
    let sp500_change = data
        .indices
        .iter()
        .find(|s| s.name == crate::config::SP500_NAME)
        .map(|s| s.change_percent)
        .unwrap_or(0.0);
    let decision = decide(sp500_change, data.vix.current, data.negative_catalysts.len());

    report.push(String::new());
    report.push(String::new());
    report.push("PRO TIP ROUTINE (10-15 minutes before trading)".to_string());
    report.push(thin);
    report.push(String::new());
    report.push(format!("1. Check Futures + VIX -> {}", decision.futures_check));
    report.push(format!("2. Check Economic Calendar -> {}", decision.econ_check));
    report.push(format!("3. Scan News for My Stocks -> {}", decision.news_check));
    report.push(format!("4. Check Technical & IV Setup -> {}", decision.technical_check));
    report.push(format!("5. DECISION: {}", decision.action));

    report.push(String::new());
    report.push(wide.clone());
    report.push("NEXT STEPS:".to_string());
    report.push(wide.clone());
    report.push(decision.next_steps);
    report.push(wide);

    report.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(closes: Vec<f64>, highs: Vec<f64>, lows: Vec<f64>) -> PriceHistory {
        PriceHistory {
            symbol: "TEST".to_string(),
            closes,
            highs,
            lows,
        }
    }

    #[test]
    fn test_vix_level_cutoffs() {
        assert_eq!(assess_vix(12.0, 13.0).level, "LOW (Complacent)");
        assert_eq!(assess_vix(17.0, 16.0).level, "NORMAL");
        assert_eq!(assess_vix(24.0, 20.0).level, "ELEVATED");
        assert_eq!(assess_vix(35.0, 30.0).level, "HIGH (Fear)");
    }

    #[test]
    fn test_vix_rising_flag() {
        assert!(assess_vix(18.0, 16.0).rising);
        assert!(!assess_vix(16.0, 18.0).rising);
    }

    #[test]
    fn test_index_snapshot_change() {
        let snapshot =
            IndexSnapshot::from_history("S&P 500", &history(vec![100.0, 102.0], vec![], vec![]))
                .unwrap();
        assert_eq!(snapshot.price, 102.0);
        assert!((snapshot.change_percent - 2.0).abs() < 1e-9);
        assert_eq!(snapshot.trend_label(), "UP");
    }

    #[test]
    fn test_economic_events_first_friday() {
        // 2025-06-06 is the first Friday of June
        let events = economic_events(NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
        assert!(events.iter().any(|e| e.contains("Jobs Report")));
        assert!(events.iter().any(|e| e.contains("LIKELY")));
        assert!(events.last().unwrap().contains("FOMC"));
    }

    #[test]
    fn test_economic_events_mid_month_inflation() {
        // 2025-06-11 is a Wednesday in the CPI/PPI window
        let events = economic_events(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
        assert!(events.iter().any(|e| e.contains("CPI/PPI")));
        assert!(!events.iter().any(|e| e.contains("Jobs Report")));
    }

    #[test]
    fn test_economic_events_quiet_day() {
        // 2025-06-03 is a Tuesday with nothing scheduled
        let events = economic_events(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(events, vec![FOMC_REMINDER.to_string()]);
    }

    #[test]
    fn test_technical_levels_from_range() {
        let levels = technical_levels(&history(
            vec![95.0, 98.0, 100.0],
            vec![101.0, 104.0, 102.0],
            vec![92.0, 94.0, 96.0],
        ))
        .unwrap();
        assert_eq!(levels.resistance, 104.0);
        assert_eq!(levels.support, 92.0);
        assert!(levels.distance_from_low > 0.0);
        assert!(levels.distance_from_high > 0.0);
    }

    #[test]
    fn test_earnings_alert_window() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let soon = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let far = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();

        assert_eq!(earnings_alert(Some(soon), today).unwrap(), "EARNINGS IN 4 DAYS");
        assert!(earnings_alert(Some(far), today).is_none());
        assert!(earnings_alert(None, today).is_none());
    }

    #[test]
    fn test_decision_ladder() {
        // VIX wins over everything else
        assert!(decide(1.0, 30.0, 0).action.contains("VIX too high"));
        // Then the catalyst count
        assert!(decide(1.0, 18.0, 6).action.contains("CAUTION"));
        // Then the index selloff
        assert!(decide(-2.0, 18.0, 0).action.contains("selling off"));
        // Otherwise go
        assert!(decide(0.5, 18.0, 0).action.contains("ENTER TRADE"));
    }

    #[test]
    fn test_render_contains_all_sections() {
        let data = ChecklistData {
            generated_at: "Monday, June 02, 2025 at 08:00 AM".to_string(),
            indices: vec![
                IndexSnapshot {
                    name: "S&P 500".to_string(),
                    price: 5300.0,
                    change_percent: 0.4,
                },
            ],
            vix: assess_vix(14.0, 15.0),
            events: economic_events(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            negative_catalysts: vec![],
            positive_catalysts: vec![Catalyst {
                symbol: "AAPL".to_string(),
                title: "Apple surges on record revenue".to_string(),
                categories: "EARNINGS".to_string(),
            }],
            technicals: vec![SymbolTechnicals {
                symbol: "AAPL".to_string(),
                levels: TechnicalLevels {
                    current_price: 178.50,
                    support: 170.0,
                    resistance: 185.0,
                    distance_from_low: 5.0,
                    distance_from_high: 3.5,
                },
                earnings_alert: Some("EARNINGS IN 3 DAYS".to_string()),
            }],
        };

        let report = render_checklist(&data);
        assert!(report.contains("DAILY OPTIONS TRADING CHECKLIST"));
        assert!(report.contains("STEP 1: MACRO & MARKET OVERVIEW"));
        assert!(report.contains("STEP 2: ECONOMIC DATA RELEASE CHECK"));
        assert!(report.contains("STEP 3: NEWS SCAN"));
        assert!(report.contains("STEP 4: TECHNICAL & VOLATILITY SETUP"));
        assert!(report.contains("POSITIVE CATALYSTS"));
        assert!(report.contains("EARNINGS IN 3 DAYS"));
        assert!(report.contains("DECISION: ENTER TRADE"));
    }
}
