//! Markdown and JSON dashboard rendering.
//!
//! Each dashboard view becomes a Markdown section. Metrics are shown as
//! headline figures and charts as tables with text bars.

use crate::analysis::{AggregateTable, Location, Measure, MonthBucket, SellerRow};
use crate::dashboard::{Dashboard, MeasureView, SellersView};
use crate::format::{format_count, format_number};
use crate::models::{Report, ReportMetadata, View};
use anyhow::Result;
use std::collections::BTreeMap;

/// Presentation settings for the Markdown report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for revenue figures.
    pub currency_prefix: String,
    /// Width of a full-scale text bar.
    pub bar_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency_prefix: "R$".to_string(),
            bar_width: 20,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Sales Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    for view in &report.views {
        let section = match view {
            View::Revenue => generate_measure_section(
                *view,
                &report.dashboard,
                &report.dashboard.revenue,
                options,
            ),
            View::Sales => generate_measure_section(
                *view,
                &report.dashboard,
                &report.dashboard.sales,
                options,
            ),
            View::Sellers => generate_sellers_section(&report.dashboard, options),
        };
        output.push_str(&section);
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Filters\n\n");
    section.push_str(&format!("- **Region:** {}\n", metadata.filters.region));
    section.push_str(&format!(
        "- **Year:** {}\n",
        metadata
            .filters
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "All years".to_string())
    ));
    if metadata.filters.sellers.is_empty() {
        section.push_str("- **Sellers:** All\n");
    } else {
        section.push_str(&format!(
            "- **Sellers:** {}\n",
            metadata.filters.sellers.join(", ")
        ));
    }
    section.push_str(&format!("- **Source:** {}\n", metadata.endpoint));
    section.push_str(&format!(
        "- **Fetched:** {}\n",
        metadata.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records:** {} of {} fetched\n",
        metadata.records_filtered, metadata.records_fetched
    ));
    if !metadata.available_sellers.is_empty() {
        section.push_str(&format!(
            "- **Available sellers:** {}\n",
            metadata.available_sellers.join(", ")
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Headline metrics shown at the top of every view.
fn generate_metrics(dashboard: &Dashboard, options: &RenderOptions) -> String {
    format!(
        "| Revenue | Sales |\n|:---:|:---:|\n| **{}** | **{}** |\n\n",
        format_number(dashboard.total_revenue, &options.currency_prefix),
        format_count(dashboard.sales_count)
    )
}

/// Generate the revenue or sales volume section.
fn generate_measure_section(
    view: View,
    dashboard: &Dashboard,
    tables: &MeasureView,
    options: &RenderOptions,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", view));
    section.push_str(&generate_metrics(dashboard, options));

    let label = measure_label(tables.by_state.measure);

    section.push_str(&format!("### {} by State (map)\n\n", label));
    section.push_str(&state_table(&tables.by_state, label, options));

    section.push_str(&format!(
        "### Top {} States ({})\n\n",
        tables.top_states.len(),
        label
    ));
    section.push_str(&state_bars(&tables.top_states, options));

    section.push_str(&format!("### Monthly {}\n\n", label));
    section.push_str(&monthly_table(&tables.by_month, options));

    section.push_str(&format!("### {} by Category\n\n", label));
    section.push_str(&category_table(&tables.by_category, label, options));

    section
}

/// Generate the sellers section.
fn generate_sellers_section(dashboard: &Dashboard, options: &RenderOptions) -> String {
    let sellers: &SellersView = &dashboard.sellers;
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", View::Sellers));
    section.push_str(&generate_metrics(dashboard, options));

    section.push_str(&format!("### Top {} Sellers (Revenue)\n\n", sellers.top_n));
    section.push_str(&seller_table(&sellers.by_revenue, Measure::Sum, options));

    section.push_str(&format!("### Top {} Sellers (Sales)\n\n", sellers.top_n));
    section.push_str(&seller_table(&sellers.by_sales, Measure::Count, options));

    section
}

fn measure_label(measure: Measure) -> &'static str {
    match measure {
        Measure::Sum => "Revenue",
        Measure::Count => "Sales",
    }
}

/// Format a measure value: revenue with the currency prefix, counts as integers.
fn format_value(value: f64, measure: Measure, options: &RenderOptions) -> String {
    match measure {
        Measure::Sum => format!("{} {:.2}", options.currency_prefix, value),
        Measure::Count => format!("{}", value as u64),
    }
}

/// Text bar proportional to `value / max`.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * width as f64).round() as usize;
    "█".repeat(len.max(1))
}

const EMPTY_TABLE: &str = "_No sales match the selected filters._\n\n";

fn state_table(table: &AggregateTable<Location>, label: &str, options: &RenderOptions) -> String {
    if table.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let mut out = format!("| State | Lat | Lon | {} |\n|:---|---:|---:|---:|\n", label);
    for row in &table.rows {
        out.push_str(&format!(
            "| {} | {:.2} | {:.2} | {} |\n",
            row.key.state,
            row.key.latitude,
            row.key.longitude,
            format_value(row.value, table.measure, options)
        ));
    }
    out.push('\n');
    out
}

fn state_bars(table: &AggregateTable<Location>, options: &RenderOptions) -> String {
    if table.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let max = table.max_value();
    let mut out = String::from("| State | Value | |\n|:---|---:|:---|\n");
    for row in &table.rows {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.key.state,
            format_value(row.value, table.measure, options),
            bar(row.value, max, options.bar_width)
        ));
    }
    out.push('\n');
    out
}

/// Month rows by year columns, one line per calendar month.
fn monthly_table(table: &AggregateTable<MonthBucket>, options: &RenderOptions) -> String {
    if table.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let years: Vec<i32> = {
        let mut years: Vec<i32> = table.keys().map(|k| k.year).collect();
        years.dedup();
        years
    };

    // month number -> (name, year -> value)
    let mut grid: BTreeMap<u32, (String, BTreeMap<i32, f64>)> = BTreeMap::new();
    for row in &table.rows {
        let month = chrono::Datelike::month(&row.key.start);
        grid.entry(month)
            .or_insert_with(|| (row.key.month.clone(), BTreeMap::new()))
            .1
            .insert(row.key.year, row.value);
    }

    let mut out = String::from("| Month |");
    for year in &years {
        out.push_str(&format!(" {} |", year));
    }
    out.push_str("\n|:---|");
    for _ in &years {
        out.push_str("---:|");
    }
    out.push('\n');

    for (name, values) in grid.values() {
        out.push_str(&format!("| {} |", name));
        for year in &years {
            match values.get(year) {
                Some(v) => out.push_str(&format!(" {} |", format_value(*v, table.measure, options))),
                None => out.push_str(" |"),
            }
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

fn category_table(table: &AggregateTable<String>, label: &str, options: &RenderOptions) -> String {
    if table.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let max = table.max_value();
    let mut out = format!("| Category | {} | |\n|:---|---:|:---|\n", label);
    for row in &table.rows {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.key,
            format_value(row.value, table.measure, options),
            bar(row.value, max, options.bar_width)
        ));
    }
    out.push('\n');
    out
}

fn seller_table(rows: &[SellerRow], measure: Measure, options: &RenderOptions) -> String {
    if rows.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let value_of = |row: &SellerRow| match measure {
        Measure::Sum => row.revenue,
        Measure::Count => row.sales as f64,
    };
    let max = rows.iter().map(&value_of).fold(0.0, f64::max);

    let mut out = format!(
        "| Seller | {} | |\n|:---|---:|:---|\n",
        measure_label(measure)
    );
    for row in rows {
        let value = value_of(row);
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.seller,
            format_value(value, measure, options),
            bar(value, max, options.bar_width)
        ));
    }
    out.push('\n');
    out
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Generated by salesdash*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FilteredSet;
    use crate::dashboard::DashboardOptions;
    use crate::models::{FilterSummary, SaleRecord};
    use chrono::Utc;

    fn create_test_report(views: Vec<View>) -> Report {
        let records: Vec<SaleRecord> =
            serde_json::from_str(include_str!("../../fixtures/sales_sample.json")).unwrap();
        let filtered = FilteredSet::from_records(records);

        Report {
            metadata: ReportMetadata {
                endpoint: "https://labdados.com/produtos".to_string(),
                fetched_at: Utc::now(),
                filters: FilterSummary {
                    region: "Brasil".to_string(),
                    year: None,
                    sellers: vec![],
                },
                records_fetched: 8,
                records_filtered: 8,
                available_sellers: vec!["Ana Souza".to_string()],
                duration_seconds: 0.4,
            },
            views,
            dashboard: Dashboard::build(&filtered, &DashboardOptions::default()),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(vec![View::Revenue, View::Sales, View::Sellers]);
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("# Sales Dashboard"));
        assert!(markdown.contains("## Revenue"));
        assert!(markdown.contains("## Sales volume"));
        assert!(markdown.contains("## Sellers"));
        assert!(markdown.contains("**R$ 940.00**"));
        assert!(markdown.contains("**8.00**"));
        assert!(markdown.contains("| BA | -13.29 | -41.71 | R$ 325.00 |"));
        assert!(markdown.contains("### Top 5 States (Sales)"));
        assert!(markdown.contains("### Top 5 Sellers (Revenue)"));
    }

    #[test]
    fn test_single_view_only() {
        let report = create_test_report(vec![View::Sellers]);
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("## Sellers"));
        assert!(!markdown.contains("## Revenue"));
        assert!(markdown.contains("| Carla Dias | R$ 450.00 |"));
    }

    #[test]
    fn test_monthly_table_pivots_years() {
        let report = create_test_report(vec![View::Sales]);
        let table = monthly_table(&report.dashboard.sales.by_month, &RenderOptions::default());

        assert!(table.starts_with("| Month | 2020 | 2021 |"));
        assert!(table.contains("| January | 3 | 0 |"));
        assert!(table.contains("| February | 0 | 2 |"));
        assert!(table.contains("| December | 0 | |"));
    }

    #[test]
    fn test_metadata_section() {
        let report = create_test_report(vec![]);
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("**Region:** Brasil"));
        assert!(section.contains("**Year:** All years"));
        assert!(section.contains("**Sellers:** All"));
        assert!(section.contains("8 of 8 fetched"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0, 4), "████");
        assert_eq!(bar(5.0, 10.0, 4), "██");
        assert_eq!(bar(0.1, 10.0, 4), "█");
        assert_eq!(bar(0.0, 10.0, 4), "");
    }

    #[test]
    fn test_empty_tables_render_placeholder() {
        let report = Report {
            dashboard: Dashboard::build(&FilteredSet::default(), &DashboardOptions::default()),
            ..create_test_report(vec![View::Revenue])
        };
        let markdown = generate_markdown_report(&report, &RenderOptions::default());
        assert!(markdown.contains("No sales match the selected filters"));
        assert!(markdown.contains("**R$ 0.00**"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(vec![View::Revenue]);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"total_revenue\""));
        assert!(json.contains("\"by_month\""));
        assert!(json.contains("\"measure\": \"sum\""));
        assert!(json.contains("\"views\""));
    }
}
