//! Sales aggregation.
//!
//! Every summary table goes through one primitive: group the filtered
//! records by a key, reduce each group with a [`Measure`], then sort and
//! truncate as the caller needs. Revenue and volume tables share their
//! grouping and join code, so the two views always line up.

use crate::analysis::filter::FilteredSet;
use crate::models::SaleRecord;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Reduction applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Sum of sale prices
    Sum,
    /// Number of sales
    Count,
}

impl Measure {
    fn accumulate(self, acc: &mut f64, record: &SaleRecord) {
        match self {
            Measure::Sum => *acc += record.price,
            Measure::Count => *acc += 1.0,
        }
    }
}

/// One row of an aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub value: f64,
}

/// Grouping key to measure value, in a meaningful order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable<K> {
    pub measure: Measure,
    pub rows: Vec<AggregateRow<K>>,
}

impl<K> AggregateTable<K> {
    /// Sort rows by value, highest first. Ties keep their current order.
    pub fn sorted_desc(mut self) -> Self {
        self.rows.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self
    }

    /// Keep only the first `n` rows.
    pub fn top(&self, n: usize) -> Self
    where
        K: Clone,
    {
        Self {
            measure: self.measure,
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Replace each key, keeping values and order.
    pub fn map_keys<J, F>(self, mut f: F) -> AggregateTable<J>
    where
        F: FnMut(K) -> J,
    {
        AggregateTable {
            measure: self.measure,
            rows: self
                .rows
                .into_iter()
                .map(|row| AggregateRow {
                    key: f(row.key),
                    value: row.value,
                })
                .collect(),
        }
    }

    /// Sum of all row values.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// Largest row value, or 0 for an empty table.
    pub fn max_value(&self) -> f64 {
        self.rows.iter().map(|r| r.value).fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|r| &r.key)
    }
}

/// Group records by `key_fn` and reduce each group with `measure`.
///
/// Groups come out in first-seen order; sorting is left to the caller.
pub fn aggregate<K, F>(records: &[SaleRecord], key_fn: F, measure: Measure) -> AggregateTable<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&SaleRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow<K>> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            rows.push(AggregateRow { key, value: 0.0 });
            rows.len() - 1
        });
        measure.accumulate(&mut rows[slot].value, record);
    }

    AggregateTable { measure, rows }
}

/// A state with the coordinates of its first record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A calendar month bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// First day of the month.
    pub start: NaiveDate,
    pub year: i32,
    /// English month name, e.g. "January".
    pub month: String,
}

impl MonthBucket {
    fn from_start(start: NaiveDate) -> Self {
        let month = chrono::Month::try_from(start.month() as u8)
            .map(|m| m.name().to_string())
            .unwrap_or_default();

        Self {
            start,
            year: start.year(),
            month,
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First-seen coordinates for each state.
fn state_coordinates(records: &[SaleRecord]) -> HashMap<&str, (f64, f64)> {
    let mut coords = HashMap::new();
    for record in records {
        coords
            .entry(record.state.as_str())
            .or_insert((record.latitude, record.longitude));
    }
    coords
}

fn by_state(filtered: &FilteredSet, measure: Measure) -> AggregateTable<Location> {
    let records = filtered.records();
    let coords = state_coordinates(records);

    aggregate(records, |r| r.state.clone(), measure)
        .map_keys(|state| {
            let (latitude, longitude) = coords.get(state.as_str()).copied().unwrap_or_default();
            Location {
                state,
                latitude,
                longitude,
            }
        })
        .sorted_desc()
}

fn by_month(filtered: &FilteredSet, measure: Measure) -> AggregateTable<MonthBucket> {
    let mut table = aggregate(filtered.records(), |r| month_start(r.purchase_date), measure);
    table.rows.sort_by_key(|row| row.key);

    let bounds = table
        .rows
        .first()
        .zip(table.rows.last())
        .map(|(first, last)| (first.key, last.key));
    let Some((first, last)) = bounds else {
        return table.map_keys(MonthBucket::from_start);
    };

    // Months without sales still get a zero row.
    let observed: HashMap<NaiveDate, f64> =
        table.rows.iter().map(|row| (row.key, row.value)).collect();
    let mut rows = Vec::new();
    let mut cursor = first;
    loop {
        rows.push(AggregateRow {
            key: cursor,
            value: observed.get(&cursor).copied().unwrap_or(0.0),
        });
        if cursor >= last {
            break;
        }
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    AggregateTable { measure, rows }.map_keys(MonthBucket::from_start)
}

fn by_category(filtered: &FilteredSet, measure: Measure) -> AggregateTable<String> {
    aggregate(filtered.records(), |r| r.category.clone(), measure).sorted_desc()
}

/// Revenue per state, highest first, with the state's coordinates.
pub fn revenue_by_state(filtered: &FilteredSet) -> AggregateTable<Location> {
    by_state(filtered, Measure::Sum)
}

/// Revenue per calendar month, chronological.
pub fn revenue_by_month(filtered: &FilteredSet) -> AggregateTable<MonthBucket> {
    by_month(filtered, Measure::Sum)
}

/// Revenue per product category, highest first.
pub fn revenue_by_category(filtered: &FilteredSet) -> AggregateTable<String> {
    by_category(filtered, Measure::Sum)
}

/// Number of sales per state, highest first, with the state's coordinates.
pub fn sales_by_state(filtered: &FilteredSet) -> AggregateTable<Location> {
    by_state(filtered, Measure::Count)
}

/// Number of sales per calendar month, chronological.
pub fn sales_by_month(filtered: &FilteredSet) -> AggregateTable<MonthBucket> {
    by_month(filtered, Measure::Count)
}

/// Number of sales per product category, highest first.
pub fn sales_by_category(filtered: &FilteredSet) -> AggregateTable<String> {
    by_category(filtered, Measure::Count)
}

/// Which seller measure to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerMeasure {
    Revenue,
    Sales,
}

/// Revenue and sale count for one seller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerRow {
    pub seller: String,
    pub revenue: f64,
    pub sales: usize,
}

/// Per-seller totals, unsorted (first-seen order).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SellerSummary {
    pub rows: Vec<SellerRow>,
}

impl SellerSummary {
    /// The `n` best sellers by the given measure.
    pub fn top(&self, n: usize, by: SellerMeasure) -> Vec<SellerRow> {
        let mut rows = self.rows.clone();
        match by {
            SellerMeasure::Revenue => rows.sort_by(|a, b| {
                b.revenue
                    .partial_cmp(&a.revenue)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SellerMeasure::Sales => rows.sort_by_key(|r| std::cmp::Reverse(r.sales)),
        }
        rows.truncate(n);
        rows
    }
}

/// Sum and count of sales per seller.
pub fn seller_summary(filtered: &FilteredSet) -> SellerSummary {
    let records = filtered.records();
    let revenue = aggregate(records, |r| r.seller.clone(), Measure::Sum);
    let sales = aggregate(records, |r| r.seller.clone(), Measure::Count);

    // Both tables share first-seen key order.
    let rows = revenue
        .rows
        .into_iter()
        .zip(sales.rows)
        .map(|(rev, cnt)| SellerRow {
            seller: rev.key,
            revenue: rev.value,
            sales: cnt.value as usize,
        })
        .collect();

    SellerSummary { rows }
}
