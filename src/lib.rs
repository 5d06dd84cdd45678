pub mod checklist;
pub mod config;
pub mod logging;
pub mod models;
pub mod news;
pub mod processor;
pub mod provider;
pub mod screener;

// Re-exports (public API)
pub use config::ScreenCriteria;
pub use models::{OptionChain, OptionContract, OptionType, PriceHistory};
pub use processor::{ProcessedContract, process_chain};
pub use provider::{QuoteProvider, YahooClient};
pub use screener::{CspCandidate, SpreadCandidate, screen_cash_secured_puts, screen_credit_spreads};
