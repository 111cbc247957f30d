//! Record filtering.
//!
//! Narrows the fetched records by region, year and seller before any
//! aggregation runs. Every active predicate must hold (logical AND); an
//! inactive one lets every record through.

use crate::models::{FilterSummary, Region, SaleRecord};
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashSet;

/// Active filter predicates. `None` / empty means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Region the purchase state must belong to.
    pub region: Option<Region>,
    /// Calendar year of the purchase date.
    pub year: Option<i32>,
    /// Sellers to keep.
    pub sellers: Vec<String>,
}

/// Query parameters understood by the products endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    /// Lowercase region name, or empty for the whole country.
    pub regiao: String,
    /// Four-digit year, or empty for every year.
    pub ano: String,
}

impl Filters {
    /// Parameters to send upstream. Sellers are always filtered locally.
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            regiao: self.region.map(|r| r.query_value()).unwrap_or_default(),
            ano: self.year.map(|y| y.to_string()).unwrap_or_default(),
        }
    }

    /// Same filters without the seller predicate.
    pub fn without_sellers(&self) -> Self {
        Self {
            sellers: Vec::new(),
            ..self.clone()
        }
    }

    /// Whether a single record passes every active predicate.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(region) = self.region {
            if !region.contains_state(&record.state) {
                return false;
            }
        }

        if let Some(year) = self.year {
            if record.purchase_date.year() != year {
                return false;
            }
        }

        self.sellers.is_empty() || self.sellers.iter().any(|s| *s == record.seller)
    }

    /// Apply the filters, producing an immutable snapshot.
    pub fn apply(&self, records: &[SaleRecord]) -> FilteredSet {
        FilteredSet {
            records: records.iter().filter(|r| self.matches(r)).cloned().collect(),
        }
    }

    /// Display form for report metadata.
    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            region: self
                .region
                .map(|r| r.to_string())
                .unwrap_or_else(|| "Brasil".to_string()),
            year: self.year,
            sellers: self.sellers.clone(),
        }
    }
}

/// Records that survived filtering. Aggregations only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSet {
    records: Vec<SaleRecord>,
}

impl FilteredSet {
    /// Wrap records without filtering them.
    #[cfg(test)]
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every record's price.
    pub fn total_revenue(&self) -> f64 {
        self.records.iter().map(|r| r.price).sum()
    }

    /// Number of sales (records).
    pub fn sales_count(&self) -> usize {
        self.records.len()
    }
}

/// Distinct sellers in order of first appearance.
pub fn available_sellers(records: &[SaleRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sellers = Vec::new();

    for record in records {
        if seen.insert(record.seller.as_str()) {
            sellers.push(record.seller.clone());
        }
    }

    sellers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SaleRecord> {
        serde_json::from_str(include_str!("../../fixtures/sales_sample.json")).unwrap()
    }

    fn all_combinations() -> Vec<Filters> {
        let regions = [None, Some(Region::Sudeste), Some(Region::Nordeste), Some(Region::Norte)];
        let years = [None, Some(2020), Some(2021), Some(2023)];
        let sellers = [
            vec![],
            vec!["Ana Souza".to_string()],
            vec!["Bruno Lima".to_string(), "Carla Dias".to_string()],
        ];

        let mut out = Vec::new();
        for region in regions {
            for year in years {
                for s in &sellers {
                    out.push(Filters {
                        region,
                        year,
                        sellers: s.clone(),
                    });
                }
            }
        }
        out
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let records = sample();
        let filtered = Filters::default().apply(&records);
        assert_eq!(filtered.records(), records.as_slice());
    }

    #[test]
    fn test_filtered_set_is_subset() {
        let records = sample();
        for filters in all_combinations() {
            let filtered = filters.apply(&records);
            assert!(filtered.len() <= records.len());
            for r in filtered.records() {
                assert!(records.contains(r), "{:?} produced a foreign record", filters);
                assert!(filters.matches(r));
            }
        }
    }

    #[test]
    fn test_region_filter() {
        let filtered = Filters {
            region: Some(Region::Sudeste),
            ..Default::default()
        }
        .apply(&sample());
        assert_eq!(filtered.len(), 5);
        assert!(filtered
            .records()
            .iter()
            .all(|r| ["SP", "RJ", "MG"].contains(&r.state.as_str())));
    }

    #[test]
    fn test_year_filter() {
        let filtered = Filters {
            year: Some(2021),
            ..Default::default()
        }
        .apply(&sample());
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filtered = Filters {
            region: Some(Region::Sudeste),
            year: Some(2021),
            sellers: vec![],
        }
        .apply(&sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].product, "Celular ABXY");
    }

    #[test]
    fn test_seller_filter() {
        let filtered = Filters {
            sellers: vec!["Ana Souza".to_string()],
            ..Default::default()
        }
        .apply(&sample());
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.total_revenue(), 225.0);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let filtered = Filters {
            region: Some(Region::Norte),
            ..Default::default()
        }
        .apply(&sample());
        assert!(filtered.is_empty());
        assert_eq!(filtered.total_revenue(), 0.0);
    }

    #[test]
    fn test_query_params() {
        assert_eq!(Filters::default().query_params(), QueryParams::default());

        let params = Filters {
            region: Some(Region::CentroOeste),
            year: Some(2022),
            sellers: vec!["Ana Souza".to_string()],
        }
        .query_params();
        assert_eq!(params.regiao, "centro-oeste");
        assert_eq!(params.ano, "2022");
    }

    #[test]
    fn test_available_sellers_first_seen_order() {
        assert_eq!(
            available_sellers(&sample()),
            vec!["Ana Souza", "Bruno Lima", "Carla Dias"]
        );
    }

    #[test]
    fn test_summary_defaults_to_brasil() {
        let summary = Filters::default().summary();
        assert_eq!(summary.region, "Brasil");
        assert!(summary.year.is_none());
    }
}
