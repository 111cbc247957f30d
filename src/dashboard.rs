//! Dashboard assembly.
//!
//! Builds every metric and table for one render from a single
//! [`FilteredSet`] snapshot.

use crate::analysis::{
    revenue_by_category, revenue_by_month, revenue_by_state, sales_by_category, sales_by_month,
    sales_by_state, seller_summary, AggregateTable, FilteredSet, Location, MonthBucket,
    SellerMeasure, SellerRow,
};
use serde::Serialize;
use tracing::debug;

/// Knobs for the top-N slices.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// States shown in the "top states" charts.
    pub top_states: usize,
    /// Sellers shown in the sellers view.
    pub top_sellers: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_states: 5,
            top_sellers: 5,
        }
    }
}

/// Tables for one measure (revenue or sales volume).
#[derive(Debug, Clone, Serialize)]
pub struct MeasureView {
    /// Every state with its coordinates (map data), highest first.
    pub by_state: AggregateTable<Location>,
    /// Leading slice of `by_state`.
    pub top_states: AggregateTable<Location>,
    /// Month-by-month series, chronological.
    pub by_month: AggregateTable<MonthBucket>,
    /// Per-category totals, highest first.
    pub by_category: AggregateTable<String>,
}

/// Top sellers ranked both ways.
#[derive(Debug, Clone, Serialize)]
pub struct SellersView {
    pub top_n: usize,
    pub by_revenue: Vec<SellerRow>,
    pub by_sales: Vec<SellerRow>,
}

/// All metrics and tables for one render.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_revenue: f64,
    pub sales_count: usize,
    pub revenue: MeasureView,
    pub sales: MeasureView,
    pub sellers: SellersView,
}

impl Dashboard {
    /// Compute the dashboard from a filtered snapshot.
    pub fn build(filtered: &FilteredSet, options: &DashboardOptions) -> Self {
        debug!(
            "Building dashboard from {} records (top states: {}, top sellers: {})",
            filtered.len(),
            options.top_states,
            options.top_sellers
        );

        let revenue_states = revenue_by_state(filtered);
        let sales_states = sales_by_state(filtered);
        let sellers = seller_summary(filtered);
        let revenue_categories = revenue_by_category(filtered);
        let sales_categories = sales_by_category(filtered);

        debug!(
            "Category totals: revenue {:.2}, sales {}",
            revenue_categories.total(),
            sales_categories.total()
        );

        Self {
            total_revenue: filtered.total_revenue(),
            sales_count: filtered.sales_count(),
            revenue: MeasureView {
                top_states: revenue_states.top(options.top_states),
                by_state: revenue_states,
                by_month: revenue_by_month(filtered),
                by_category: revenue_categories,
            },
            sales: MeasureView {
                top_states: sales_states.top(options.top_states),
                by_state: sales_states,
                by_month: sales_by_month(filtered),
                by_category: sales_categories,
            },
            sellers: SellersView {
                top_n: options.top_sellers,
                by_revenue: sellers.top(options.top_sellers, SellerMeasure::Revenue),
                by_sales: sellers.top(options.top_sellers, SellerMeasure::Sales),
            },
        }
    }
}
