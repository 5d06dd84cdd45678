use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News categories keyed by headline keywords
pub const NEWS_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "EARNINGS",
        &["earnings", "revenue", "profit", "eps", "guidance", "beat", "miss", "quarterly"],
    ),
    (
        "UPGRADE/DOWNGRADE",
        &["upgrade", "downgrade", "rating", "price target", "analyst", "overweight", "underweight"],
    ),
    (
        "REGULATORY",
        &["fda", "sec", "lawsuit", "investigation", "fine", "regulation", "approval"],
    ),
    (
        "GEOPOLITICAL",
        &["tariff", "china", "trade war", "sanctions", "russia", "conflict"],
    ),
    (
        "ECONOMIC",
        &["fed", "inflation", "interest rate", "recession", "gdp", "jobs", "unemployment"],
    ),
    (
        "CORPORATE",
        &["merger", "acquisition", "ceo", "layoff", "restructure", "deal", "partnership"],
    ),
    (
        "PRODUCT",
        &["launch", "recall", "innovation", "patent", "new product"],
    ),
];

// Headline polarity word lists. Deliberately small: this is a coarse
// catalyst flag for the checklist, not a sentiment model.
const POSITIVE_WORDS: &[&str] = &[
    "beat", "beats", "surge", "surges", "soar", "soars", "rally", "rallies", "gain",
    "gains", "jump", "jumps", "record", "strong", "upgrade", "upgraded", "growth",
    "profit", "outperform", "bullish", "approval", "approved", "win", "wins",
];

const NEGATIVE_WORDS: &[&str] = &[
    "miss", "misses", "plunge", "plunges", "fall", "falls", "drop", "drops", "slump",
    "slumps", "loss", "losses", "weak", "downgrade", "downgraded", "lawsuit",
    "investigation", "recall", "layoff", "layoffs", "cut", "cuts", "warn", "warns",
    "bearish", "fraud", "bankruptcy",
];

const SENTIMENT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sentiment {
    /// Polarity in [-1, 1].
    pub score: f64,
    pub label: String, // "POSITIVE", "NEGATIVE" or "NEUTRAL"
}

impl Sentiment {
    pub fn is_negative(&self) -> bool {
        self.label == "NEGATIVE"
    }

    pub fn is_positive(&self) -> bool {
        self.label == "POSITIVE"
    }
}

/// One processed headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub symbol: String,
    pub title: String,
    pub publisher: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub days_ago: i64,
    pub sentiment: Sentiment,
    pub categories: Vec<String>,
}

/// Categorize a headline by keyword match; "GENERAL" when nothing hits.
pub fn categorize(title: &str) -> Vec<String> {
    let title_lower = title.to_lowercase();
    let categories: Vec<String> = NEWS_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| title_lower.contains(k)))
        .map(|(category, _)| category.to_string())
        .collect();

    if categories.is_empty() {
        vec!["GENERAL".to_string()]
    } else {
        categories
    }
}

/// Score a headline by counting polarity words. The score is the hit
/// imbalance normalized by total hits, so a mixed headline lands near zero.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(w)).count() as f64;
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(w)).count() as f64;
    let hits = positive + negative;

    let score = if hits > 0.0 { (positive - negative) / hits } else { 0.0 };

    let label = if score > SENTIMENT_THRESHOLD {
        "POSITIVE"
    } else if score < -SENTIMENT_THRESHOLD {
        "NEGATIVE"
    } else {
        "NEUTRAL"
    };

    Sentiment {
        score,
        label: label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_earnings_headline() {
        let categories = categorize("Apple earnings beat estimates on strong iPhone revenue");
        assert!(categories.contains(&"EARNINGS".to_string()));
    }

    #[test]
    fn test_categorize_multiple_categories() {
        let categories = categorize("FDA approval boosts merger talks");
        assert!(categories.contains(&"REGULATORY".to_string()));
        assert!(categories.contains(&"CORPORATE".to_string()));
    }

    #[test]
    fn test_categorize_falls_back_to_general() {
        assert_eq!(categorize("Shares trade sideways"), vec!["GENERAL".to_string()]);
    }

    #[test]
    fn test_positive_sentiment() {
        let sentiment = analyze_sentiment("Stock surges to record high after strong quarter");
        assert!(sentiment.is_positive());
        assert!(sentiment.score > 0.0);
    }

    #[test]
    fn test_negative_sentiment() {
        let sentiment = analyze_sentiment("Shares plunge as lawsuit and layoffs weigh");
        assert!(sentiment.is_negative());
        assert!(sentiment.score < 0.0);
    }

    #[test]
    fn test_neutral_when_no_polarity_words() {
        let sentiment = analyze_sentiment("Company schedules annual shareholder meeting");
        assert_eq!(sentiment.label, "NEUTRAL");
        assert_eq!(sentiment.score, 0.0);
    }

    #[test]
    fn test_mixed_headline_lands_neutral() {
        // One positive and one negative hit cancel out
        let sentiment = analyze_sentiment("Earnings beat but shares fall");
        assert_eq!(sentiment.label, "NEUTRAL");
        assert_eq!(sentiment.score, 0.0);
    }
}
