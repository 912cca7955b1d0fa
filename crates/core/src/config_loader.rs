use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging `config/Config.toml`, an optional
    /// `config/Config.json`, and `SCALPER_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the
    /// merged configuration fails validation.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Same as [`ConfigLoader::load`] with an explicit TOML path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the
    /// merged configuration fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        Self::load_profile_from(path, None)
    }

    /// Loads `config/Config.toml` with a `config/Config.{profile}.toml` overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the
    /// merged configuration fails validation.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::load_profile_from(DEFAULT_CONFIG_PATH, Some(profile))
    }

    /// Loads `path`, then overlays `Config.{profile}.toml` from the same
    /// directory when a profile is given. Environment variables win over both.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the
    /// merged configuration fails validation.
    pub fn load_profile_from(path: impl AsRef<Path>, profile: Option<&str>) -> Result<AppConfig> {
        let path = path.as_ref();
        let mut figment = Figment::new().merge(Toml::file(path));
        if let Some(profile) = profile {
            let overlay = path.with_file_name(format!("Config.{profile}.toml"));
            tracing::debug!(overlay = %overlay.display(), "Applying config profile");
            figment = figment.merge(Toml::file(overlay));
        }

        let config: AppConfig = figment
            .merge(Env::prefixed("SCALPER_").split("__"))
            .join(Json::file(path.with_file_name("Config.json")))
            .extract()
            .with_context(|| match profile {
                Some(profile) => format!(
                    "Failed to load configuration from {} with profile '{profile}'",
                    path.display()
                ),
                None => format!("Failed to load configuration from {}", path.display()),
            })?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            profile = profile.unwrap_or("-"),
            symbol = %config.instrument.symbol,
            "Configuration loaded"
        );
        Ok(config)
    }
}
