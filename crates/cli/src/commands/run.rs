//! Long-running bot: feed, notifiers, trading cycle and the actor that owns it.

use anyhow::{Context, Result};
use clap::Args;
use scalper_bot_orchestrator::BotActor;
use scalper_core::{AppConfig, MarketHours, NotificationSink};
use scalper_notifier::{FanoutNotifier, LogNotifier, MessageFormatter, TelegramNotifier};
use scalper_options_manager::TradingCycle;
use scalper_price_feed::PriceFeed;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Bot identifier used in logs and status
    #[arg(long, default_value = "scalper")]
    pub bot_id: String,

    /// Start with the trading switch off (overrides capital.global_enabled)
    #[arg(long)]
    pub disabled: bool,
}

fn build_notifier(config: &AppConfig, hours: &MarketHours) -> Result<FanoutNotifier> {
    let mut notifier = FanoutNotifier::new().with_sink(Arc::new(LogNotifier));

    if config.telegram.enabled {
        let formatter = MessageFormatter::new(config.instrument.symbol.clone(), hours.timezone());
        if let Some(telegram) = TelegramNotifier::from_env(&config.telegram, formatter)? {
            tracing::info!("Telegram notifications enabled");
            notifier = notifier.with_sink(Arc::new(telegram));
        }
    }

    Ok(notifier)
}

/// Runs the bot until Ctrl-C, then shuts the actor down and logs the final
/// account state.
///
/// # Errors
///
/// Fails if the feed, notifiers or cycle cannot be built, or if the actor
/// task panics.
pub async fn run_bot(mut config: AppConfig, args: RunArgs) -> Result<()> {
    if args.disabled {
        config.capital.global_enabled = false;
    }

    let hours = MarketHours::from_config(&config.schedule)?;
    let feed = PriceFeed::from_config(&config.feed).context("Failed to build price feed")?;
    let notifier: Arc<dyn NotificationSink> = Arc::new(build_notifier(&config, &hours)?);
    let cycle = TradingCycle::new(&config, Box::new(feed), notifier)?;

    let (handle, task) = BotActor::spawn(args.bot_id.clone(), cycle, None);
    tracing::info!(bot_id = %args.bot_id, "Bot running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested");

    match handle.get_status().await {
        Ok(status) => tracing::info!(
            capital = %status.engine.current_capital,
            daily_pnl = %status.engine.daily_pnl,
            wins = status.engine.wins,
            losses = status.engine.losses,
            open = status.engine.open_positions.len(),
            "Final account state"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not read final status"),
    }

    handle.shutdown().await?;
    task.await.context("Bot task panicked")??;
    Ok(())
}
