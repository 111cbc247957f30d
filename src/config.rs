//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salesdash.toml` files.

use crate::cli::OutputFormat;
use crate::source::DEFAULT_ENDPOINT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".salesdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Products endpoint settings.
    #[serde(default)]
    pub source: SourceSettings,

    /// Dashboard layout settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path; stdout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: None,
            format: OutputFormat::default(),
        }
    }
}

/// Products endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Products endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Dashboard layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// States shown in the "top states" charts.
    #[serde(default = "default_top_states")]
    pub top_states: usize,

    /// Sellers shown in the sellers view (2-10).
    #[serde(default = "default_top_sellers")]
    pub top_sellers: usize,

    /// Prefix for revenue figures.
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,

    /// Width of the text bars in Markdown tables.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_states: default_top_states(),
            top_sellers: default_top_sellers(),
            currency_prefix: default_currency_prefix(),
            bar_width: default_bar_width(),
        }
    }
}

fn default_top_states() -> usize {
    5
}

fn default_top_sellers() -> usize {
    5
}

fn default_currency_prefix() -> String {
    "R$".to_string()
}

fn default_bar_width() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.salesdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref endpoint) = args.endpoint {
            self.source.endpoint = endpoint.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(top_states) = args.top_states {
            self.dashboard.top_states = top_states;
        }
        if let Some(top_sellers) = args.top_sellers {
            self.dashboard.top_sellers = top_sellers;
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
    }

    /// Check values a config file could have set out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !(2..=10).contains(&self.dashboard.top_sellers) {
            return Err("Top sellers must be between 2 and 10".to_string());
        }
        if self.dashboard.top_states == 0 {
            return Err("Top states must be at least 1".to_string());
        }
        if self.source.timeout_seconds == 0 {
            return Err("Timeout must be at least 1 second".to_string());
        }
        if !self.source.endpoint.starts_with("http://")
            && !self.source.endpoint.starts_with("https://")
        {
            return Err("Endpoint must start with 'http://' or 'https://'".to_string());
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
