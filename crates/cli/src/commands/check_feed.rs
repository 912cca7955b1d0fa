//! One-shot connectivity test against the configured price feed.

use anyhow::{Context, Result};
use clap::Args;
use scalper_core::{AppConfig, PriceSource};
use scalper_price_feed::PriceFeed;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct CheckFeedArgs {
    /// Number of fetches to perform
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,
}

/// Fetches the spot price `count` times and reports each outcome.
///
/// # Errors
///
/// Fails if the feed cannot be built or if every fetch fails.
pub async fn run_check_feed(config: AppConfig, args: CheckFeedArgs) -> Result<()> {
    let feed = PriceFeed::from_config(&config.feed).context("Failed to build price feed")?;
    println!(
        "Checking {} feed for {}",
        feed.name(),
        config.instrument.symbol
    );

    let mut successes = 0u32;
    for attempt in 1..=args.count.max(1) {
        let started = Instant::now();
        match feed.spot_price().await {
            Ok(price) => {
                successes += 1;
                println!(
                    "  [{attempt}] OK   {price} ({} ms)",
                    started.elapsed().as_millis()
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "Feed check failed");
                println!("  [{attempt}] FAIL {e}");
            }
        }
    }

    anyhow::ensure!(successes > 0, "price feed unavailable");
    Ok(())
}
