//! Data source adapter for the remote products endpoint.

pub mod client;

pub use client::{SalesClient, SourceConfig, DEFAULT_ENDPOINT};
