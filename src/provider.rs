use crate::config::{self, ScreenCriteria};
use crate::models::{
    ChartResponse, OptionChain, OptionType, OptionsResponse, PriceHistory, QuoteSummaryResponse,
    SearchResponse,
};
use crate::news::{self, NewsItem};
use crate::processor::days_to_expiry;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

// -----------------------------------------------
// DATA SOURCE CAPABILITY
// -----------------------------------------------

/// The narrow surface the screener and checklist need from a market data
/// source. Production uses [`YahooClient`]; tests use synthetic fixtures.
pub trait QuoteProvider {
    /// Current price plus all option quotes whose expiration falls inside
    /// the criteria's DTE window.
    async fn option_chain(&self, symbol: &str, criteria: &ScreenCriteria) -> Result<OptionChain>;

    /// Daily close/high/low series, oldest first.
    async fn history(&self, symbol: &str, range: &str) -> Result<PriceHistory>;

    /// Recent headlines, categorized and sentiment-scored.
    async fn stock_news(&self, symbol: &str, max_articles: usize) -> Result<Vec<NewsItem>>;

    /// Next scheduled earnings date, if the source knows one.
    async fn next_earnings(&self, symbol: &str) -> Result<Option<NaiveDate>>;
}

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct YahooClient {
    client: Client,
    warmed_up: Arc<RwLock<bool>>,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            warmed_up: Arc::new(RwLock::new(false)),
        })
    }

    /// Warmup session cookies (only once per client)
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            let _ = self
                .client
                .get(config::YAHOO_BASE_URL)
                .header("Accept", config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up Yahoo session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    /// Generic retry fetch. Retries rate limits and server errors, fails
    /// immediately on other client errors, and rejects non-JSON bodies
    /// (Yahoo serves consent/error pages as HTML with status 200).
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .header("Referer", config::HEADER_REFERER)
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();
            debug!(url, status = status.as_u16(), "fetched");

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    warn!(url, "non-JSON response");
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(url, status = status.as_u16(), "retryable error");
                anyhow::bail!("Retryable error: {}", status)
            } else {
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Client error {}: {}", status, preview)
            }
        })
        .await
    }

    // -----------------------------------------------
    // OPTION CHAIN (price + expirations + quotes)
    // -----------------------------------------------
    pub async fn fetch_option_chain(
        &self,
        symbol: &str,
        criteria: &ScreenCriteria,
    ) -> Result<OptionChain> {
        // First call without a date lists every expiration and carries the
        // underlying quote.
        let text = self.fetch_json(&config::options_url(symbol, None)).await?;
        let response: OptionsResponse =
            serde_json::from_str(&text).context("Failed to parse option chain listing")?;

        let listing = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No option data returned for {symbol}"))?;

        let underlying_price = listing.quote.regular_market_price;
        let today = Local::now().date_naive();

        // Only pull the expirations the DTE window can use.
        let mut in_window = Vec::new();
        for epoch in listing.expiration_dates {
            let date = epoch_to_date(epoch)?;
            let dte = days_to_expiry(date, today);
            if dte >= criteria.min_dte && dte <= criteria.max_dte {
                in_window.push((epoch, date));
            }
        }

        let mut contracts = Vec::new();
        for (epoch, date) in in_window {
            let text = self
                .fetch_json(&config::options_url(symbol, Some(epoch)))
                .await?;
            let response: OptionsResponse =
                serde_json::from_str(&text).context("Failed to parse option chain slice")?;

            let Some(result) = response.option_chain.result.into_iter().next() else {
                continue;
            };
            for slice in result.options {
                contracts.extend(
                    slice
                        .puts
                        .into_iter()
                        .map(|c| c.into_contract(date, OptionType::Put)),
                );
                contracts.extend(
                    slice
                        .calls
                        .into_iter()
                        .map(|c| c.into_contract(date, OptionType::Call)),
                );
            }
        }

        Ok(OptionChain {
            symbol: symbol.to_string(),
            underlying_price,
            timestamp: Utc::now(),
            contracts,
        })
    }

    // -----------------------------------------------
    // BATCH FETCH WITH BOUNDED CONCURRENCY
    // -----------------------------------------------
    pub async fn fetch_all_option_chains(
        self: Arc<Self>,
        symbols: Vec<String>,
        max_concurrent: usize,
        criteria: ScreenCriteria,
    ) -> Vec<Result<OptionChain>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut handles = vec![];

        for symbol in symbols {
            let client = Arc::clone(&self);
            let sem = Arc::clone(&semaphore);
            let criteria = criteria.clone();

            let handle = tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| anyhow!("Semaphore error: {}", e))?;

                client.fetch_option_chain(&symbol, &criteria).await
            });

            handles.push(handle);
        }

        let mut results = vec![];
        for handle in handles {
            match handle.await {
                Ok(res) => results.push(res),
                Err(e) => results.push(Err(anyhow!("Task error: {}", e))),
            }
        }

        results
    }

    // -----------------------------------------------
    // DAILY PRICE HISTORY
    // -----------------------------------------------
    pub async fn fetch_history(&self, symbol: &str, range: &str) -> Result<PriceHistory> {
        let text = self.fetch_json(&config::chart_url(symbol, range)).await?;
        let response: ChartResponse =
            serde_json::from_str(&text).context("Failed to parse chart data")?;

        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No chart data returned for {symbol}"))?;

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Chart data for {symbol} has no quote series"))?;

        Ok(PriceHistory {
            symbol: result.meta.symbol,
            closes: quote.close.into_iter().flatten().collect(),
            highs: quote.high.into_iter().flatten().collect(),
            lows: quote.low.into_iter().flatten().collect(),
        })
    }

    // -----------------------------------------------
    // NEWS HEADLINES
    // -----------------------------------------------
    pub async fn fetch_news(&self, symbol: &str, max_articles: usize) -> Result<Vec<NewsItem>> {
        let text = self
            .fetch_json(&config::news_search_url(symbol, max_articles))
            .await?;
        let response: SearchResponse =
            serde_json::from_str(&text).context("Failed to parse news search")?;

        let now = Utc::now();
        let items = response
            .news
            .into_iter()
            .take(max_articles)
            .filter_map(|article| {
                let published =
                    DateTime::from_timestamp(article.provider_publish_time.unwrap_or(0), 0)?;
                Some(NewsItem {
                    symbol: symbol.to_string(),
                    sentiment: news::analyze_sentiment(&article.title),
                    categories: news::categorize(&article.title),
                    title: article.title,
                    publisher: article.publisher.unwrap_or_else(|| "Unknown".to_string()),
                    link: article.link.unwrap_or_default(),
                    days_ago: (now - published).num_days(),
                    published,
                })
            })
            .collect();

        Ok(items)
    }

    // -----------------------------------------------
    // EARNINGS CALENDAR
    // -----------------------------------------------
    pub async fn fetch_next_earnings(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let text = self.fetch_json(&config::calendar_events_url(symbol)).await?;
        let response: QuoteSummaryResponse =
            serde_json::from_str(&text).context("Failed to parse calendar events")?;

        let date = response
            .quote_summary
            .result
            .into_iter()
            .flatten()
            .next()
            .and_then(|r| r.calendar_events)
            .and_then(|c| c.earnings)
            .and_then(|e| e.earnings_date.into_iter().find_map(|v| v.raw))
            .and_then(|epoch| epoch_to_date(epoch).ok());

        Ok(date)
    }
}

impl QuoteProvider for YahooClient {
    async fn option_chain(&self, symbol: &str, criteria: &ScreenCriteria) -> Result<OptionChain> {
        self.fetch_option_chain(symbol, criteria).await
    }

    async fn history(&self, symbol: &str, range: &str) -> Result<PriceHistory> {
        self.fetch_history(symbol, range).await
    }

    async fn stock_news(&self, symbol: &str, max_articles: usize) -> Result<Vec<NewsItem>> {
        self.fetch_news(symbol, max_articles).await
    }

    async fn next_earnings(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        self.fetch_next_earnings(symbol).await
    }
}

fn epoch_to_date(epoch: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| anyhow!("Invalid expiration timestamp: {}", epoch))
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()).unwrap();
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?)
}
