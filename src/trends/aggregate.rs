//! Fans one metric out across a whole keyword group and merges the partial
//! results.
//!
//! All requests for a metric run concurrently and all are awaited. If any
//! fails, the first failure in input order is returned and every sibling
//! result is dropped. On success every keyword is present in the result,
//! holes filled with the metric's default.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::services::trend_api::TrendApi;
use crate::trends::batcher;
use crate::trends::fetcher::{fetch_averages, fetch_related};
use crate::trends::types::{
    QueryParams, RelatedItems, RelatedKind, Scores, merge_related, merge_scores,
};

/// Interest averages for every keyword, one request per batch (see
/// [`batcher::split`]). Keywords the service left out score 0.
#[tracing::instrument(skip_all, fields(kind = "average", keywords = keywords.len()))]
pub async fn aggregate_averages<A: TrendApi + ?Sized>(
    api: &A,
    keywords: &[String],
    params: &QueryParams,
) -> Result<Scores, FetchError> {
    let batches = batcher::split(keywords);
    debug!(requests = batches.len(), "Issuing average requests");

    let results = join_all(batches.iter().map(|batch| fetch_averages(api, batch, params))).await;

    let mut merged = Scores::new();
    for result in results {
        match result {
            Ok(partial) => merge_scores(&mut merged, partial),
            Err(e) => {
                warn!(error = %e, "Average request failed, discarding group aggregate");
                return Err(e);
            }
        }
    }

    for keyword in keywords {
        merged.entry(keyword.clone()).or_insert(0);
    }
    Ok(merged)
}

/// Related queries or topics for every keyword, one request per keyword.
/// Keywords without results map to an empty list.
#[tracing::instrument(skip(api, keywords, kind, params), fields(kind = %kind, keywords = keywords.len()))]
pub async fn aggregate_related<A: TrendApi + ?Sized>(
    api: &A,
    keywords: &[String],
    kind: RelatedKind,
    params: &QueryParams,
) -> Result<RelatedItems, FetchError> {
    debug!(requests = keywords.len(), "Issuing related requests");

    let results = join_all(
        keywords
            .iter()
            .map(|keyword| fetch_related(api, keyword, kind, params)),
    )
    .await;

    let mut merged = RelatedItems::new();
    for (keyword, result) in keywords.iter().zip(results) {
        match result {
            Ok(items) => merge_related(&mut merged, RelatedItems::from([(keyword.clone(), items)])),
            Err(e) => {
                warn!(error = %e, "Related request failed, discarding group aggregate");
                return Err(e);
            }
        }
    }

    for keyword in keywords {
        merged.entry(keyword.clone()).or_default();
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::trends::testing::{FakeTrends, kw, params};
    use crate::trends::types::MetricKind;

    fn letters(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("kw{i}")).collect()
    }

    #[tokio::test]
    async fn test_averages_batched_and_merged() {
        let keywords = letters(11);
        let mut api = FakeTrends::new();
        for (i, k) in keywords.iter().enumerate() {
            api = api.with_average(k, i as u32 * 5);
        }

        let scores = aggregate_averages(&api, &keywords, &params()).await.unwrap();

        let sizes: Vec<usize> = api.average_batches().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 6]);
        assert_eq!(scores.len(), 11);
        assert_eq!(scores["kw10"], 50);
    }

    #[tokio::test]
    async fn test_merge_is_total_when_upstream_short() {
        let keywords = letters(7);
        let api = FakeTrends::new().with_raw_averages(vec![10]);

        let scores = aggregate_averages(&api, &keywords, &params()).await.unwrap();

        for k in &keywords {
            assert!(scores.contains_key(k), "missing {k}");
        }
        assert_eq!(scores["kw6"], 0);
    }

    #[tokio::test]
    async fn test_related_one_request_per_keyword() {
        let api = FakeTrends::new().with_topics("a", &["t1"]);
        let items = aggregate_related(&api, &kw(&["a", "b", "c"]), RelatedKind::Topics, &params())
            .await
            .unwrap();

        assert_eq!(api.related_calls(), 3);
        assert_eq!(items["a"], kw(&["t1"]));
        assert!(items["b"].is_empty());
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_any_batch_failure_fails_aggregate() {
        let keywords = letters(10);
        let api = FakeTrends::new()
            .failing_averages_for("kw7", UpstreamError::Transport("reset".into()));

        let err = aggregate_averages(&api, &keywords, &params())
            .await
            .unwrap_err();

        assert_eq!(err.kind, MetricKind::Average);
        assert!(err.subject.contains(&"kw7".to_string()));
        // both batches were still issued
        assert_eq!(api.average_batches().len(), 2);
    }

    #[tokio::test]
    async fn test_first_related_failure_in_input_order_wins() {
        let api = FakeTrends::new()
            .failing_queries_for("b", UpstreamError::Transport("reset".into()))
            .failing_queries_for("c", UpstreamError::RateLimited("429".into()));

        let err = aggregate_related(&api, &kw(&["a", "b", "c"]), RelatedKind::Queries, &params())
            .await
            .unwrap_err();

        assert_eq!(err.kind, MetricKind::RelatedQueries);
        assert_eq!(err.subject, kw(&["b"]));
        assert_eq!(api.related_calls(), 3);
    }
}
