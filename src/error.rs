//! Failure taxonomy for trend fetching.
//!
//! Errors are layered: the upstream adapter produces [`UpstreamError`], the
//! fetcher tags it with the metric kind and the keywords involved
//! ([`FetchError`]), and the assembler tags that with the whole group
//! ([`GroupFailure`]).

use thiserror::Error;

use crate::trends::types::MetricKind;

/// A failure reported by the upstream trend service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The service signalled request throttling.
    #[error("rate limited by upstream: {0}")]
    RateLimited(String),
    /// Connection-level failure, timeout or unexpected HTTP status.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body could not be parsed into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// One failed upstream call, tagged with what was being fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} fetch failed for [{}]: {source}", .subject.join(", "))]
pub struct FetchError {
    pub kind: MetricKind,
    /// The batch (for averages) or single keyword (for related lists).
    pub subject: Vec<String>,
    #[source]
    pub source: UpstreamError,
}

impl FetchError {
    pub fn new(kind: MetricKind, subject: &[String], source: UpstreamError) -> Self {
        Self {
            kind,
            subject: subject.to_vec(),
            source,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.source, UpstreamError::RateLimited(_))
    }
}

/// A keyword group that could not be assembled because one metric failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("group [{}] failed on {kind}: {source}", .group.join(", "))]
pub struct GroupFailure {
    pub group: Vec<String>,
    pub kind: MetricKind,
    #[source]
    pub source: FetchError,
}

impl GroupFailure {
    pub fn is_rate_limited(&self) -> bool {
        self.source.is_rate_limited()
    }
}

/// Problems with the keyword input file.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Csv(#[from] csv::Error),
    #[error("input contains no keyword groups")]
    Empty,
    #[error("keyword group must contain at least one keyword")]
    EmptyGroup,
}
