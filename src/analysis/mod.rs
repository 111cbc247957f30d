//! Filtering and aggregation of sale records.
//!
//! Records flow one way: fetched records are narrowed by [`Filters`] into
//! a [`FilteredSet`], which every aggregation borrows without mutating.

pub mod aggregator;
pub mod filter;

pub use aggregator::*;
pub use filter::{available_sellers, FilteredSet, Filters, QueryParams};
