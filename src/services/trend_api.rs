//! Trait and types for interacting with a trend-data service.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::UpstreamError;
use crate::trends::types::QueryParams;

/// A related topic as the service describes it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topic {
    #[serde(default)]
    pub mid: Option<String>,
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// One entry of a ranked list. Query lists fill `query`, topic lists fill `topic`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub formatted_value: Option<String>,
}

/// One section of a ranked list (the service returns "top" and "rising").
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSection {
    #[serde(default)]
    pub ranked_keyword: Vec<RankedItem>,
}

pub type RankedList = Vec<RankedSection>;

/// Abstraction over a trend-data provider (e.g., Google Trends).
///
/// Implementations translate their transport failures into
/// [`UpstreamError`], attaching [`UpstreamError::RateLimited`] whenever the
/// provider signals throttling.
#[async_trait]
pub trait TrendApi: Send + Sync {
    /// Average interest per keyword, parallel to `keywords`. May be shorter.
    async fn interest_over_time(
        &self,
        keywords: &[String],
        params: &QueryParams,
    ) -> Result<Vec<u32>, UpstreamError>;

    /// Ranked related search queries for a single keyword.
    async fn related_queries(
        &self,
        keyword: &str,
        params: &QueryParams,
    ) -> Result<RankedList, UpstreamError>;

    /// Ranked related topics for a single keyword.
    async fn related_topics(
        &self,
        keyword: &str,
        params: &QueryParams,
    ) -> Result<RankedList, UpstreamError>;
}
