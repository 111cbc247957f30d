//! Data models for the sales dashboard.
//!
//! This module contains the sale record as delivered by the products
//! endpoint, the fixed region catalogue, and the report envelope.

use crate::dashboard::Dashboard;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single product sale, as returned by the products endpoint.
///
/// Field names on the wire are Portuguese; see the `rename` attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Product name.
    #[serde(rename = "Produto")]
    pub product: String,
    /// Product category.
    #[serde(rename = "Categoria do Produto")]
    pub category: String,
    /// Sale price.
    #[serde(rename = "Preço")]
    pub price: f64,
    /// Freight charged on the sale.
    #[serde(rename = "Frete", default, skip_serializing_if = "Option::is_none")]
    pub freight: Option<f64>,
    /// Purchase date, `dd/mm/yyyy` on the wire.
    #[serde(rename = "Data da Compra", with = "purchase_date")]
    pub purchase_date: NaiveDate,
    /// Seller name.
    #[serde(rename = "Vendedor")]
    pub seller: String,
    /// State code (UF) where the purchase happened.
    #[serde(rename = "Local da compra")]
    pub state: String,
    /// Customer rating of the purchase.
    #[serde(
        rename = "Avaliação da compra",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<u32>,
    /// Payment method.
    #[serde(
        rename = "Tipo de pagamento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_type: Option<String>,
    /// Number of installments.
    #[serde(
        rename = "Quantidade de parcelas",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub installments: Option<u32>,
    /// Latitude of the state.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude of the state.
    #[serde(rename = "lon")]
    pub longitude: f64,
}

/// Serde adapter for the endpoint's `dd/mm/yyyy` dates.
mod purchase_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("invalid purchase date '{}': {}", raw, e))
        })
    }
}

/// Geographic region of Brazil, used as the top-level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::CentroOeste => write!(f, "Centro-Oeste"),
            Region::Nordeste => write!(f, "Nordeste"),
            Region::Norte => write!(f, "Norte"),
            Region::Sudeste => write!(f, "Sudeste"),
            Region::Sul => write!(f, "Sul"),
        }
    }
}

impl Region {
    /// State codes (UF) belonging to this region.
    pub fn states(&self) -> &'static [&'static str] {
        match self {
            Region::CentroOeste => &["DF", "GO", "MT", "MS"],
            Region::Nordeste => &["AL", "BA", "CE", "MA", "PB", "PE", "PI", "RN", "SE"],
            Region::Norte => &["AC", "AP", "AM", "PA", "RO", "RR", "TO"],
            Region::Sudeste => &["ES", "MG", "RJ", "SP"],
            Region::Sul => &["PR", "RS", "SC"],
        }
    }

    /// Whether the given state code belongs to this region.
    pub fn contains_state(&self, state: &str) -> bool {
        let state = state.trim();
        self.states().iter().any(|uf| uf.eq_ignore_ascii_case(state))
    }

    /// Lowercase name as the endpoint's `regiao` parameter expects it.
    pub fn query_value(&self) -> String {
        self.to_string().to_lowercase()
    }
}

/// One of the three dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Revenue tables and metrics
    Revenue,
    /// Sales volume tables and metrics
    Sales,
    /// Top sellers by revenue and by volume
    Sellers,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Revenue => write!(f, "Revenue"),
            View::Sales => write!(f, "Sales volume"),
            View::Sellers => write!(f, "Sellers"),
        }
    }
}

/// Filters that were active for a render, in display form.
#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    /// Region name, or "Brasil" when unfiltered.
    pub region: String,
    /// Year, or `None` for every year.
    pub year: Option<i32>,
    /// Selected sellers; empty means all.
    pub sellers: Vec<String>,
}

/// Metadata about a dashboard render.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Products endpoint the data came from.
    pub endpoint: String,
    /// When the data was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Filters in effect.
    pub filters: FilterSummary,
    /// Records returned by the endpoint.
    pub records_fetched: usize,
    /// Records left after filtering.
    pub records_filtered: usize,
    /// Sellers available for selection after region/year filtering.
    pub available_sellers: Vec<String>,
    /// Wall-clock duration of the render in seconds.
    pub duration_seconds: f64,
}

/// A rendered dashboard: metadata plus the computed tables.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Metadata about the render.
    pub metadata: ReportMetadata,
    /// Views selected for output.
    pub views: Vec<View>,
    /// Metrics and aggregate tables.
    pub dashboard: Dashboard,
}
