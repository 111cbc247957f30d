//! Salesdash - command-line sales dashboard
//!
//! Fetches a product-sales dataset, filters it by region, year and
//! seller, aggregates it into summary tables and renders them as a
//! Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, fetch or decode failure)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod format;
mod models;
mod report;
mod source;

use analysis::{available_sellers, Filters};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dashboard::{Dashboard, DashboardOptions};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata, SaleRecord};
use report::RenderOptions;
use source::{SalesClient, SourceConfig};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Salesdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_dashboard(args).await {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .salesdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the endpoint, top-N sizes and output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the report can be piped from stdout.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one render: fetch, filter, aggregate, output.
async fn run_dashboard(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().map_err(|e| anyhow!(e))?;

    let filters = args.filters();

    // Step 1: Fetch the dataset
    let client = SalesClient::new(SourceConfig::from(&config.source))
        .context("Failed to create HTTP client")?;
    let records = fetch_records(&client, &filters, args.quiet).await?;
    let fetched_at = Utc::now();

    // Step 2: Filter
    let available = available_sellers(filters.without_sellers().apply(&records).records());
    for seller in &filters.sellers {
        if !available.contains(seller) {
            warn!("Seller '{}' has no sales for the selected region/year", seller);
        }
    }

    let filtered = filters.apply(&records);
    info!(
        "{} of {} records match the filters",
        filtered.len(),
        records.len()
    );
    if filtered.is_empty() {
        warn!("No sales match the selected filters");
    }

    // Step 3: Aggregate
    let dashboard_options = DashboardOptions {
        top_states: config.dashboard.top_states,
        top_sellers: config.dashboard.top_sellers,
    };
    let dashboard = Dashboard::build(&filtered, &dashboard_options);

    // Step 4: Render
    let report = Report {
        metadata: ReportMetadata {
            endpoint: client.endpoint().to_string(),
            fetched_at,
            filters: filters.summary(),
            records_fetched: records.len(),
            records_filtered: filtered.len(),
            available_sellers: available,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        views: args.tab.views(),
        dashboard,
    };

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            let render_options = RenderOptions {
                currency_prefix: config.dashboard.currency_prefix.clone(),
                bar_width: config.dashboard.bar_width,
            };
            report::generate_markdown_report(&report, &render_options)
        }
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            if !args.quiet {
                eprintln!("✅ Dashboard saved to: {}", path);
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Fetch the records, with a spinner unless running quietly.
async fn fetch_records(
    client: &SalesClient,
    filters: &Filters,
    quiet: bool,
) -> Result<Vec<SaleRecord>> {
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching sales from {}", client.endpoint()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = client.fetch(&filters.query_params()).await;

    if let Some(pb) = spinner {
        match result {
            Ok(ref records) => pb.finish_with_message(format!("Fetched {} records", records.len())),
            Err(_) => pb.abandon_with_message("Fetch failed"),
        }
    }

    result.context("Failed to fetch sales data")
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
