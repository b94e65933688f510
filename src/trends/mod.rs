//! Batched trend aggregation.
//!
//! Keyword groups are split into upstream-sized batches, fetched
//! concurrently for each metric kind, merged back into per-group results and
//! finally combined into one ranked view across groups.

pub mod aggregate;
pub mod assemble;
pub mod batcher;
pub mod combine;
pub mod fetcher;
pub mod language;
pub mod run;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
