//! Trade preview: which strike a signal would open right now.

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use scalper_core::{AppConfig, Direction, PriceSource, Signal, SignalOrigin, SignalStrength};
use scalper_options_manager::{ExitEvaluator, SelectionRejection, StrikeSelection, StrikeSelector};
use scalper_price_feed::PriceFeed;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Trade direction (call or put)
    #[arg(short, long)]
    pub direction: Direction,

    /// Spot price to quote against; fetched from the feed when omitted
    #[arg(short, long)]
    pub spot: Option<Decimal>,
}

/// Prints the strike selection for `args.direction` at the given or live spot,
/// sized against the configured starting capital.
///
/// # Errors
///
/// Fails if no spot was given and the feed cannot deliver one.
pub async fn run_quote(config: AppConfig, args: QuoteArgs) -> Result<()> {
    let spot = match args.spot {
        Some(spot) => spot,
        None => {
            let feed = PriceFeed::from_config(&config.feed).context("Failed to build price feed")?;
            feed.spot_price()
                .await
                .context("Failed to fetch spot price")?
        }
    };
    anyhow::ensure!(spot > Decimal::ZERO, "spot must be positive, got {spot}");

    println!("{}", preview(&config, args.direction, spot));
    Ok(())
}

fn preview(config: &AppConfig, direction: Direction, spot: Decimal) -> String {
    let selector = StrikeSelector::from_config(config);
    let signal = Signal {
        direction,
        reference_price: spot,
        strength: SignalStrength::Moderate,
        origin: SignalOrigin::External,
    };

    match selector.select(&signal, spot, config.capital.starting_capital) {
        Ok(selection) => describe(config, &selection),
        Err(rejection) => describe_rejection(config, direction, spot, &rejection),
    }
}

fn describe(config: &AppConfig, selection: &StrikeSelection) -> String {
    let (target, stop) =
        ExitEvaluator::from_config(&config.exits).reference_premiums(selection.estimated_premium);
    format!(
        "{symbol} {strike} {direction} @ spot {spot}\n\
         premium   {premium} (distance {distance})\n\
         size      {lots} lot(s) = {quantity} qty\n\
         invest    {investment}\n\
         target    {target}\n\
         stop      {stop}",
        symbol = config.instrument.symbol,
        strike = selection.strike,
        direction = selection.direction,
        spot = selection.spot,
        premium = selection.estimated_premium,
        distance = selection.distance,
        lots = selection.lots,
        quantity = selection.quantity,
        investment = selection.investment,
    )
}

fn describe_rejection(
    config: &AppConfig,
    direction: Direction,
    spot: Decimal,
    rejection: &SelectionRejection,
) -> String {
    format!(
        "{} {direction} @ spot {spot}: no trade ({rejection})",
        config.instrument.symbol
    )
}
