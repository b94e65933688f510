//! Google Trends adapter for [`TrendApi`](crate::services::trend_api::TrendApi).

mod client;

pub use client::{GoogleTrendsClient, GoogleTrendsConfig};
