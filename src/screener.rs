use crate::config::{CONTRACT_MULTIPLIER, ScreenCriteria};
use crate::models::OptionType;
use crate::processor::{ProcessedContract, by_expiration, within_windows};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Strike prices rarely carry more than two decimals; this absorbs float
/// noise without ever matching a neighboring strike.
const WIDTH_EPSILON: f64 = 1e-6;

/// A qualifying credit spread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpreadCandidate {
    pub symbol: String,
    pub strategy: String, // "BPS" or "BCS"
    pub current_price: f64,
    pub short_strike: f64,
    pub long_strike: f64,
    pub short_premium: f64,
    pub long_premium: f64,
    pub credit: f64,
    pub spread_width: f64,
    pub max_risk: f64,
    pub otm_percent: f64,
    pub return_on_risk: f64,
    pub annualized_return: f64,
    pub expiration: NaiveDate,
    pub days_to_expiry: i64,
}

/// A qualifying cash secured put
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CspCandidate {
    pub symbol: String,
    pub current_price: f64,
    pub strike: f64,
    pub premium: f64,
    pub max_risk: f64,
    pub otm_percent: f64,
    pub return_on_risk: f64,
    pub annualized_return: f64,
    pub expiration: NaiveDate,
    pub days_to_expiry: i64,
}

/// Find credit-spread candidates on one side of the chain.
///
/// The short leg must sit inside the OTM and DTE windows (inclusive); the
/// long leg must sit exactly `spread_width` further out of the money on the
/// same expiration. A short strike with no long leg at exactly that width is
/// dropped, which is an empty result rather than an error. Output is ranked
/// by descending return on risk.
pub fn screen_credit_spreads(
    symbol: &str,
    current_price: f64,
    contracts: &[ProcessedContract],
    side: OptionType,
    criteria: &ScreenCriteria,
) -> Result<Vec<SpreadCandidate>> {
    if current_price <= 0.0 {
        bail!("invalid underlying price {current_price} for {symbol}");
    }

    // Spread legs trade thinner than outright puts; floors are halved the
    // same way the single-leg screen relaxes them.
    let min_volume = criteria.min_volume / 2;
    let min_open_interest = criteria.min_open_interest / 2;

    let strategy = match side {
        OptionType::Put => "BPS",
        OptionType::Call => "BCS",
    };

    let mut candidates = Vec::new();

    for (_, expiry_chain) in by_expiration(contracts) {
        for short in expiry_chain.iter().filter(|c| c.contract.option_type == side) {
            if !within_windows(short, criteria) {
                continue;
            }
            if !leg_is_liquid(short, min_volume, min_open_interest) {
                continue;
            }

            // Long leg sits further OTM: below the short strike for puts,
            // above it for calls.
            let target_strike = match side {
                OptionType::Put => short.contract.strike - criteria.spread_width,
                OptionType::Call => short.contract.strike + criteria.spread_width,
            };

            let Some(long) = expiry_chain.iter().find(|c| {
                c.contract.option_type == side
                    && (c.contract.strike - target_strike).abs() < WIDTH_EPSILON
                    && leg_is_liquid(c, min_volume, min_open_interest)
            }) else {
                continue;
            };

            let credit = short.mid - long.mid;
            let max_risk = criteria.spread_width * CONTRACT_MULTIPLIER - credit * CONTRACT_MULTIPLIER;
            if credit <= 0.0 || max_risk <= 0.0 {
                continue;
            }

            let return_on_risk = credit * CONTRACT_MULTIPLIER / max_risk * 100.0;
            if return_on_risk < criteria.min_return_on_risk {
                continue;
            }

            candidates.push(SpreadCandidate {
                symbol: symbol.to_string(),
                strategy: strategy.to_string(),
                current_price,
                short_strike: short.contract.strike,
                long_strike: long.contract.strike,
                short_premium: short.mid,
                long_premium: long.mid,
                credit,
                spread_width: criteria.spread_width,
                max_risk,
                otm_percent: short.otm_percent,
                return_on_risk,
                annualized_return: annualize(return_on_risk, short.days_to_expiry),
                expiration: short.contract.expiration,
                days_to_expiry: short.days_to_expiry,
            });
        }
    }

    candidates.sort_by(|a, b| b.return_on_risk.total_cmp(&a.return_on_risk));
    Ok(candidates)
}

/// Find cash-secured-put candidates: single short puts inside the OTM and
/// DTE windows with full liquidity floors.
pub fn screen_cash_secured_puts(
    symbol: &str,
    current_price: f64,
    contracts: &[ProcessedContract],
    criteria: &ScreenCriteria,
) -> Result<Vec<CspCandidate>> {
    if current_price <= 0.0 {
        bail!("invalid underlying price {current_price} for {symbol}");
    }

    let mut candidates: Vec<CspCandidate> = contracts
        .iter()
        .filter(|c| c.contract.option_type == OptionType::Put)
        .filter(|c| within_windows(c, criteria))
        .filter(|c| leg_is_liquid(c, criteria.min_volume, criteria.min_open_interest))
        .filter_map(|c| {
            let return_on_risk = c.mid / c.contract.strike * 100.0;
            if return_on_risk < criteria.min_return_on_risk {
                return None;
            }
            Some(CspCandidate {
                symbol: symbol.to_string(),
                current_price,
                strike: c.contract.strike,
                premium: c.mid,
                max_risk: c.contract.strike * CONTRACT_MULTIPLIER,
                otm_percent: c.otm_percent,
                return_on_risk,
                annualized_return: annualize(return_on_risk, c.days_to_expiry),
                expiration: c.contract.expiration,
                days_to_expiry: c.days_to_expiry,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.return_on_risk.total_cmp(&a.return_on_risk));
    Ok(candidates)
}

fn leg_is_liquid(contract: &ProcessedContract, min_volume: u64, min_open_interest: u64) -> bool {
    crate::processor::is_liquid(&contract.contract, min_volume, min_open_interest)
}

fn annualize(return_on_risk: f64, days_to_expiry: i64) -> f64 {
    return_on_risk * (365.0 / days_to_expiry.max(1) as f64)
}
