//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `TRIPSPLIT_*` environment variables
//! (e.g. `TRIPSPLIT_APP__LEVEL=debug`).
use api_types::Currency;
use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Report {
    pub format: Format,
    /// Used when a trip file does not name its currency.
    pub default_currency: Currency,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub report: Report,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_PATH)).required(false))
            .add_source(Environment::with_prefix("TRIPSPLIT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
