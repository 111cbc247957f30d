//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::Filters;
use crate::models::{Region, View};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Years the products endpoint has data for.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2020..=2023;

/// Salesdash - command-line sales dashboard
///
/// Fetches product sales, filters them by region, year and seller, and
/// renders revenue, sales volume and top-seller tables.
///
/// Examples:
///   salesdash
///   salesdash --region sudeste --year 2022
///   salesdash --seller "Ana Souza,Bruno Lima" --tab sellers --top-sellers 3
///   salesdash --format json --output dashboard.json
///   salesdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Region to filter by ("brasil" for the whole country)
    #[arg(short, long, default_value = "brasil", value_name = "REGION")]
    pub region: RegionChoice,

    /// Year to filter by (2020-2023); omit for every year
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Sellers to include (repeatable or comma-separated); omit for all
    #[arg(short, long = "seller", value_name = "NAME", value_delimiter = ',')]
    pub sellers: Vec<String>,

    /// Number of sellers in the sellers view (2-10)
    #[arg(long, value_name = "COUNT")]
    pub top_sellers: Option<usize>,

    /// Number of states in the top-states tables
    #[arg(long, value_name = "COUNT")]
    pub top_states: Option<usize>,

    /// Dashboard view to render
    #[arg(short, long, default_value = "all", value_name = "TAB")]
    pub tab: Tab,

    /// Products endpoint URL
    #[arg(long, value_name = "URL", env = "SALESDASH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .salesdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Region selector values, including the whole country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RegionChoice {
    /// Whole country (no region filter)
    #[default]
    Brasil,
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl RegionChoice {
    /// The region filter this choice stands for.
    pub fn region(self) -> Option<Region> {
        match self {
            RegionChoice::Brasil => None,
            RegionChoice::CentroOeste => Some(Region::CentroOeste),
            RegionChoice::Nordeste => Some(Region::Nordeste),
            RegionChoice::Norte => Some(Region::Norte),
            RegionChoice::Sudeste => Some(Region::Sudeste),
            RegionChoice::Sul => Some(Region::Sul),
        }
    }
}

/// Dashboard view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Tab {
    /// All three views (default)
    #[default]
    All,
    /// Revenue
    Revenue,
    /// Sales volume
    Sales,
    /// Top sellers
    Sellers,
}

impl Tab {
    /// Views rendered for this tab.
    pub fn views(self) -> Vec<View> {
        match self {
            Tab::All => vec![View::Revenue, View::Sales, View::Sellers],
            Tab::Revenue => vec![View::Revenue],
            Tab::Sales => vec![View::Sales],
            Tab::Sellers => vec![View::Sellers],
        }
    }
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Filters selected on the command line.
    pub fn filters(&self) -> Filters {
        Filters {
            region: self.region.region(),
            year: self.year,
            sellers: self
                .sellers
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(year) = self.year {
            if !YEAR_RANGE.contains(&year) {
                return Err(format!(
                    "Year must be between {} and {}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                ));
            }
        }

        if let Some(top) = self.top_sellers {
            if !(2..=10).contains(&top) {
                return Err("Top sellers must be between 2 and 10".to_string());
            }
        }

        if self.top_states == Some(0) {
            return Err("Top states must be at least 1".to_string());
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
