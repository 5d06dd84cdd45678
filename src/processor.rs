use crate::config::ScreenCriteria;
use crate::models::{OptionChain, OptionContract};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Option contract with computed screening fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedContract {
    #[serde(flatten)]
    pub contract: OptionContract,

    pub days_to_expiry: i64,
    pub otm_percent: f64,
    /// Midpoint of bid and ask.
    pub mid: f64,
}

/// Calculate calendar days from `today` to an expiration date.
///
/// Negative for already-expired contracts; callers window on DTE so those
/// simply fall out of range.
pub fn days_to_expiry(expiration: NaiveDate, today: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// Distance between strike and spot as a percent of spot, unsigned.
pub fn otm_percent(current_price: f64, strike: f64) -> f64 {
    ((current_price - strike).abs() / current_price) * 100.0
}

/// Midpoint premium. Only defined when both sides of the book are quoted.
pub fn mid_premium(contract: &OptionContract) -> Option<f64> {
    match (contract.bid, contract.ask) {
        (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 => Some((bid + ask) / 2.0),
        _ => None,
    }
}

/// Volume/open-interest floor check.
pub fn is_liquid(contract: &OptionContract, min_volume: u64, min_open_interest: u64) -> bool {
    contract.volume.unwrap_or(0) >= min_volume
        && contract.open_interest.unwrap_or(0) >= min_open_interest
}

/// Compute DTE, OTM percent and mid premium for every quotable contract in
/// the chain. Contracts missing a two-sided quote are dropped here; they
/// cannot price a spread leg.
pub fn process_chain(chain: &OptionChain, today: NaiveDate) -> Vec<ProcessedContract> {
    chain
        .contracts
        .iter()
        .filter_map(|contract| {
            let mid = mid_premium(contract)?;
            Some(ProcessedContract {
                days_to_expiry: days_to_expiry(contract.expiration, today),
                otm_percent: otm_percent(chain.underlying_price, contract.strike),
                mid,
                contract: contract.clone(),
            })
        })
        .collect()
}

/// Group processed contracts per expiration date. BTreeMap keeps the
/// expirations in calendar order for stable output.
pub fn by_expiration(contracts: &[ProcessedContract]) -> BTreeMap<NaiveDate, Vec<&ProcessedContract>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&ProcessedContract>> = BTreeMap::new();
    for contract in contracts {
        grouped
            .entry(contract.contract.expiration)
            .or_default()
            .push(contract);
    }
    grouped
}

/// True when the contract passes the OTM and DTE windows. Bounds are
/// inclusive on both ends.
pub fn within_windows(processed: &ProcessedContract, criteria: &ScreenCriteria) -> bool {
    processed.otm_percent >= criteria.min_otm_percent
        && processed.otm_percent <= criteria.max_otm_percent
        && processed.days_to_expiry >= criteria.min_dte
        && processed.days_to_expiry <= criteria.max_dte
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionType;
    use chrono::{DateTime, Utc};

    fn put(strike: f64, expiration: NaiveDate, bid: f64, ask: f64) -> OptionContract {
        OptionContract {
            strike,
            expiration,
            option_type: OptionType::Put,
            bid: Some(bid),
            ask: Some(ask),
            last_price: Some((bid + ask) / 2.0),
            volume: Some(100),
            open_interest: Some(500),
            implied_volatility: Some(0.3),
        }
    }

    #[test]
    fn test_days_to_expiry() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(days_to_expiry(expiry, today), 14);
        assert_eq!(days_to_expiry(today, today), 0);

        // Past expiration goes negative, which the DTE window excludes
        let past = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(days_to_expiry(past, today), -1);
    }

    #[test]
    fn test_otm_percent() {
        // Put side: strike below spot
        assert!((otm_percent(178.50, 150.0) - 15.966).abs() < 0.001);
        // Call side: strike above spot, same magnitude rule
        assert!((otm_percent(100.0, 110.0) - 10.0).abs() < 1e-9);
        assert_eq!(otm_percent(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_mid_premium_requires_two_sided_quote() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let quoted = put(150.0, today, 1.40, 1.50);
        assert_eq!(mid_premium(&quoted), Some(1.45));

        let mut one_sided = quoted.clone();
        one_sided.ask = Some(0.0);
        assert_eq!(mid_premium(&one_sided), None);

        let mut unquoted = quoted;
        unquoted.bid = None;
        assert_eq!(mid_premium(&unquoted), None);
    }

    #[test]
    fn test_process_chain_drops_unquotable_contracts() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();

        let mut dead = put(145.0, expiry, 0.0, 0.0);
        dead.bid = Some(0.0);

        let chain = OptionChain {
            symbol: "TEST".to_string(),
            underlying_price: 178.50,
            timestamp: DateTime::<Utc>::MIN_UTC,
            contracts: vec![put(150.0, expiry, 1.40, 1.50), dead],
        };

        let processed = process_chain(&chain, today);
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].contract.strike, 150.0);
        assert_eq!(processed[0].days_to_expiry, 14);
        assert_eq!(processed[0].mid, 1.45);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let criteria = ScreenCriteria::default();

        // Strike at exactly 15% OTM with spot 200, DTE exactly at the min
        let expiry = today + chrono::Duration::days(criteria.min_dte);
        let processed = ProcessedContract {
            days_to_expiry: criteria.min_dte,
            otm_percent: otm_percent(200.0, 170.0),
            mid: 1.0,
            contract: put(170.0, expiry, 0.95, 1.05),
        };
        assert_eq!(processed.otm_percent, 15.0);
        assert!(within_windows(&processed, &criteria));

        // One day past the max DTE falls out
        let late = ProcessedContract {
            days_to_expiry: criteria.max_dte + 1,
            ..processed.clone()
        };
        assert!(!within_windows(&late, &criteria));
    }

    #[test]
    fn test_by_expiration_groups_in_calendar_order() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let near = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        let far = NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();

        let chain = OptionChain {
            symbol: "TEST".to_string(),
            underlying_price: 100.0,
            timestamp: DateTime::<Utc>::MIN_UTC,
            contracts: vec![
                put(85.0, far, 0.50, 0.60),
                put(85.0, near, 0.30, 0.40),
                put(80.0, near, 0.15, 0.25),
            ],
        };
        let processed = process_chain(&chain, today);
        let grouped = by_expiration(&processed);

        let expirations: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(expirations, vec![near, far]);
        assert_eq!(grouped[&near].len(), 2);
        assert_eq!(grouped[&far].len(), 1);
    }
}
