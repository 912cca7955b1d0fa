use anyhow::Result;
use scalper_core::AppConfig;

/// Prints the merged configuration (file, profile and `SCALPER_` overrides).
///
/// # Errors
///
/// Fails only if the configuration cannot be serialized.
pub fn show_config(config: &AppConfig) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &AppConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
