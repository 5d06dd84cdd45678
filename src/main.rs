use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use options_screener::checklist::{self, gather_checklist_data};
use options_screener::config::{self, ScreenCriteria};
use options_screener::models::{OptionChain, OptionType};
use options_screener::processor;
use options_screener::provider::YahooClient;
use options_screener::screener::{self, CspCandidate, SpreadCandidate};
use options_screener::logging;
use std::sync::Arc;

/// Screen the full ticker universe for credit spreads and cash secured puts
async fn run_screen(criteria: &ScreenCriteria) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Credit Spread Screener".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!(
        "{} DTE: {}-{} days | OTM: {}-{}%",
        "ℹ".blue(),
        criteria.min_dte,
        criteria.max_dte,
        criteria.min_otm_percent,
        criteria.max_otm_percent
    );
    println!(
        "{} Spread width: ${:.2} | Min ROR: {}%",
        "ℹ".blue(),
        criteria.spread_width,
        criteria.min_return_on_risk
    );
    println!();

    let client = Arc::new(YahooClient::new()?);
    let symbols = config::screen_universe();
    let max_concurrent = config::get_max_concurrent();

    println!(
        "{}",
        format!("Step 1: Fetching option chains for {} symbols...", symbols.len()).cyan()
    );
    println!("{} Max concurrent requests: {}", "ℹ".blue(), max_concurrent);
    println!();

    let start_time = std::time::Instant::now();

    let results = Arc::clone(&client)
        .fetch_all_option_chains(symbols.clone(), max_concurrent, criteria.clone())
        .await;

    let elapsed = start_time.elapsed();

    let mut successful: Vec<OptionChain> = Vec::new();
    let mut failed = Vec::new();

    for (symbol, result) in symbols.iter().zip(results.into_iter()) {
        match result {
            Ok(chain) => {
                successful.push(chain);
                print!("{}", ".".green()); // Progress indicator
            }
            Err(e) => {
                failed.push((symbol.clone(), e.to_string()));
                print!("{}", "✗".red());
            }
        }
    }

    println!("\n");

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Fetch Summary".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Successful: {}", "✓".green(), successful.len());
    println!("{} Failed: {}", "✗".red(), failed.len());
    println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
    if !symbols.is_empty() {
        println!(
            "{} Avg time per symbol: {:.2}s",
            "⏱".yellow(),
            elapsed.as_secs_f64() / symbols.len() as f64
        );
    }
    println!();

    if !failed.is_empty() {
        println!("{}", "Failed Symbols:".red());
        for (symbol, error) in failed.iter().take(10) {
            println!(
                "  {} {} → {}",
                "✗".red(),
                symbol.yellow(),
                error.chars().take(80).collect::<String>()
            );
        }
        if failed.len() > 10 {
            println!("  ... and {} more", failed.len() - 10);
        }
        println!();
    }

    // A symbol with a bad quote or empty window just drops out here; the
    // rest of the run continues.
    println!("{}", "Step 2: Applying screening filters...".cyan());
    let today = Local::now().date_naive();
    let mut spreads: Vec<SpreadCandidate> = Vec::new();
    let mut csps: Vec<CspCandidate> = Vec::new();

    for chain in &successful {
        let processed = processor::process_chain(chain, today);

        match screener::screen_credit_spreads(
            &chain.symbol,
            chain.underlying_price,
            &processed,
            OptionType::Put,
            criteria,
        ) {
            Ok(found) => spreads.extend(found),
            Err(e) => println!("  {} {} → {}", "✗".red(), chain.symbol.yellow(), e),
        }

        match screener::screen_cash_secured_puts(&chain.symbol, chain.underlying_price, &processed, criteria)
        {
            Ok(found) => csps.extend(found),
            Err(_) => {} // already reported above for the same chain
        }
    }

    spreads.sort_by(|a, b| b.return_on_risk.total_cmp(&a.return_on_risk));
    csps.sort_by(|a, b| b.return_on_risk.total_cmp(&a.return_on_risk));

    display_results(&spreads, &csps);

    println!("{}", "Saving results to screen_results.json...".cyan());
    let output = serde_json::json!({
        "criteria": criteria,
        "spreads": spreads,
        "cash_secured_puts": csps,
    });
    std::fs::write("screen_results.json", serde_json::to_string_pretty(&output)?)?;
    println!(
        "{} Saved {} spreads and {} cash secured puts",
        "✓".green(),
        spreads.len(),
        csps.len()
    );

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Done!".green().bold());
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

/// Print the ranked candidate tables
fn display_results(spreads: &[SpreadCandidate], csps: &[CspCandidate]) {
    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "BULL PUT SPREAD (BPS) OPPORTUNITIES".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("Total candidates found: {}", spreads.len());

    if spreads.is_empty() {
        println!("No spread candidates found matching criteria");
    } else {
        for (i, trade) in spreads.iter().take(15).enumerate() {
            println!(
                "\n{:2}. {:5} | Current: ${:7.2} | Spread: ${:.2}/${:.2}",
                i + 1,
                trade.symbol.yellow(),
                trade.current_price,
                trade.short_strike,
                trade.long_strike
            );
            println!(
                "    Width: ${:.2} | Credit: ${:.2} | Max Risk: ${:.0}",
                trade.spread_width, trade.credit, trade.max_risk
            );
            println!(
                "    Return on Risk: {:.1}% | Annualized: {:.0}%",
                trade.return_on_risk, trade.annualized_return
            );
            println!(
                "    Expiry: {} ({} DTE) | {:.1}% OTM",
                trade.expiration, trade.days_to_expiry, trade.otm_percent
            );
        }
    }

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "CASH SECURED PUT (CSP) OPPORTUNITIES".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("Total candidates found: {}", csps.len());

    if csps.is_empty() {
        println!("No CSP candidates found matching criteria");
    } else {
        for (i, trade) in csps.iter().take(15).enumerate() {
            println!(
                "\n{:2}. {:5} | Current: ${:7.2} | Strike: ${:7.2} ({:.1}% OTM)",
                i + 1,
                trade.symbol.yellow(),
                trade.current_price,
                trade.strike,
                trade.otm_percent
            );
            println!(
                "    Premium: ${:.2} | Max Risk: ${:.0}",
                trade.premium, trade.max_risk
            );
            println!(
                "    Return on Risk: {:.1}% | Annualized: {:.0}%",
                trade.return_on_risk, trade.annualized_return
            );
            println!("    Expiry: {} ({} DTE)", trade.expiration, trade.days_to_expiry);
        }
    }

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Summary".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Total BPS opportunities: {}", "ℹ".blue(), spreads.len());
    println!("{} Total CSP opportunities: {}", "ℹ".blue(), csps.len());
    if !spreads.is_empty() {
        let avg: f64 =
            spreads.iter().map(|t| t.return_on_risk).sum::<f64>() / spreads.len() as f64;
        println!("{} Average BPS return on risk: {:.1}%", "ℹ".blue(), avg);
    }
    if !csps.is_empty() {
        let avg: f64 = csps.iter().map(|t| t.return_on_risk).sum::<f64>() / csps.len() as f64;
        println!("{} Average CSP return on risk: {:.1}%", "ℹ".blue(), avg);
    }
    println!();
}

/// Build and print the daily checklist, then export it to a text file
async fn run_checklist() -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Daily Trading Checklist".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Fetching market data, this may take a minute...".cyan());
    println!();

    let client = YahooClient::new()?;
    let data = gather_checklist_data(&client).await;
    let report = checklist::render_checklist(&data);

    println!("{}", report);

    let filename = format!("trading_checklist_{}.txt", Local::now().format("%Y%m%d_%H%M"));
    std::fs::write(&filename, &report)?;
    println!();
    println!("{} Checklist exported to {}", "✓".green(), filename.yellow());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let mode = config::get_execution_mode();

    // Criteria problems are caught before any network traffic
    let criteria = ScreenCriteria::from_env();
    if let Err(e) = criteria.validate() {
        eprintln!("Invalid screening criteria: {e:#}");
        std::process::exit(1);
    }

    match mode.as_str() {
        "screen" => run_screen(&criteria).await?,
        "checklist" => run_checklist().await?,
        "both" => {
            run_checklist().await?;
            println!();
            run_screen(&criteria).await?;
        }
        _ => {
            eprintln!("Invalid mode '{}'. Use 'screen', 'checklist', or 'both'", mode);
            eprintln!("Set SCREENER_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  SCREENER_MODE=screen cargo run               # Run the options screener");
            eprintln!("  SCREENER_MODE=checklist cargo run            # Print the daily checklist");
            eprintln!("  SCREENER_MODE=both cargo run                 # Checklist first, then screen");
            eprintln!("  SCREENER_MIN_DTE=7 SCREENER_MAX_DTE=14 SCREENER_MODE=screen cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
