use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, Utc};
use options_screener::checklist::{gather_checklist_data, render_checklist};
use options_screener::config::ScreenCriteria;
use options_screener::models::{OptionChain, PriceHistory};
use options_screener::news::{self, NewsItem};
use options_screener::provider::QuoteProvider;

/// Scripted data source so the checklist pipeline runs without the network.
struct StubProvider;

impl QuoteProvider for StubProvider {
    async fn option_chain(&self, symbol: &str, _criteria: &ScreenCriteria) -> Result<OptionChain> {
        anyhow::bail!("option chains are not used by the checklist: {symbol}")
    }

    async fn history(&self, symbol: &str, range: &str) -> Result<PriceHistory> {
        let (closes, highs, lows) = match (symbol, range) {
            // Index series for the overview section
            ("^GSPC", _) => (vec![5300.0, 5250.0], vec![], vec![]),
            ("^IXIC", _) => (vec![17000.0, 17100.0], vec![], vec![]),
            ("^DJI", _) => (vec![39000.0, 39000.0], vec![], vec![]),
            // Elevated and rising VIX
            ("^VIX", _) => (vec![15.0, 22.0], vec![], vec![]),
            // Technicals for the stock that made the news
            ("AAPL", _) => (
                vec![170.0, 175.0, 178.5],
                vec![180.0, 182.0, 185.0],
                vec![168.0, 169.0, 171.0],
            ),
            _ => (vec![100.0, 101.0], vec![102.0], vec![99.0]),
        };
        Ok(PriceHistory {
            symbol: symbol.to_string(),
            closes,
            highs,
            lows,
        })
    }

    async fn stock_news(&self, symbol: &str, _max_articles: usize) -> Result<Vec<NewsItem>> {
        if symbol != "AAPL" {
            return Ok(vec![]);
        }

        let title = "Apple shares plunge as lawsuit and layoffs weigh";
        Ok(vec![NewsItem {
            symbol: symbol.to_string(),
            title: title.to_string(),
            publisher: "Newswire".to_string(),
            link: String::new(),
            published: Utc::now(),
            days_ago: 0,
            sentiment: news::analyze_sentiment(title),
            categories: news::categorize(title),
        }])
    }

    async fn next_earnings(&self, _symbol: &str) -> Result<Option<NaiveDate>> {
        Ok(Some(Local::now().date_naive() + Duration::days(3)))
    }
}

#[tokio::test]
async fn test_checklist_pipeline_with_stub_provider() {
    let data = gather_checklist_data(&StubProvider).await;

    // All four indices came through
    assert_eq!(data.indices.len(), 4);
    let sp500 = data.indices.iter().find(|s| s.name == "S&P 500").unwrap();
    assert!(sp500.change_percent < 0.0);
    assert_eq!(sp500.trend_label(), "DOWN");

    // VIX at 22 classifies as elevated and rising
    assert_eq!(data.vix.level, "ELEVATED");
    assert!(data.vix.rising);

    // The scripted headline lands as a negative catalyst
    assert_eq!(data.negative_catalysts.len(), 1);
    assert_eq!(data.negative_catalysts[0].symbol, "AAPL");
    assert!(data.negative_catalysts[0].categories.contains("REGULATORY"));
    assert!(data.positive_catalysts.is_empty());

    // Technicals follow the stock with news, with the earnings flag set
    assert_eq!(data.technicals.len(), 1);
    let tech = &data.technicals[0];
    assert_eq!(tech.symbol, "AAPL");
    assert_eq!(tech.levels.resistance, 185.0);
    assert_eq!(tech.levels.support, 168.0);
    assert_eq!(tech.earnings_alert.as_deref(), Some("EARNINGS IN 3 DAYS"));

    // The standing FOMC reminder is always present
    assert!(data.events.iter().any(|e| e.contains("FOMC")));
}

#[tokio::test]
async fn test_rendered_report_reflects_gathered_data() {
    let data = gather_checklist_data(&StubProvider).await;
    let report = render_checklist(&data);

    assert!(report.contains("DAILY OPTIONS TRADING CHECKLIST"));
    assert!(report.contains("S&P 500"));
    assert!(report.contains("ELEVATED"));
    assert!(report.contains("NEGATIVE CATALYSTS"));
    assert!(report.contains("Apple shares plunge"));
    assert!(report.contains("EARNINGS IN 3 DAYS"));
    // VIX 22 is below the wait threshold, one catalyst is below the limit,
    // and the S&P drawdown is milder than the -1.5% trigger
    assert!(report.contains("DECISION: ENTER TRADE"));
    // Rendered output is plain text, safe to write straight to a file
    assert!(!report.contains('\u{1b}'));
}
