use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{CheckFeedArgs, QuoteArgs, RunArgs};

#[derive(Parser)]
#[command(name = "scalper")]
#[command(about = "Intraday options scalping engine for NSE index options", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(
        short,
        long,
        global = true,
        env = "SCALPER_CONFIG",
        default_value = "config/Config.toml"
    )]
    config: PathBuf,

    /// Profile overlay, read from `Config.<profile>.toml` next to the config file
    #[arg(short, long, global = true, env = "SCALPER_PROFILE")]
    profile: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading bot until Ctrl-C
    Run(RunArgs),
    /// Fetch one spot price from the configured feed
    CheckFeed(CheckFeedArgs),
    /// Preview the strike a signal would open
    Quote(QuoteArgs),
    /// Print the effective configuration as JSON
    ShowConfig,
}

fn init_tracing(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config =
        scalper_core::ConfigLoader::load_profile_from(&cli.config, cli.profile.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run_bot(config, args).await?,
        Commands::CheckFeed(args) => commands::run_check_feed(config, args).await?,
        Commands::Quote(args) => commands::run_quote(config, args).await?,
        Commands::ShowConfig => commands::show_config(&config)?,
    }

    Ok(())
}
