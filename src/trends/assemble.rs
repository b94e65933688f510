//! Builds a [`GroupResult`] from the three metric aggregations of one group.

use tracing::{info, warn};

use crate::error::{FetchError, GroupFailure};
use crate::services::trend_api::TrendApi;
use crate::trends::aggregate::{aggregate_averages, aggregate_related};
use crate::trends::types::{GroupResult, KeywordGroup, MetricKind, QueryParams, RelatedKind};

/// Runs all three metric aggregations for `group` concurrently.
///
/// The group is produced only if all three succeed. Otherwise the failure of
/// the first failing kind (average, related queries, related topics) is
/// returned, tagged with that kind.
#[tracing::instrument(skip_all, fields(group = %group.keywords().join(", ")))]
pub async fn assemble<A: TrendApi + ?Sized>(
    api: &A,
    group: &KeywordGroup,
    params: &QueryParams,
) -> Result<GroupResult, GroupFailure> {
    let keywords = group.keywords();

    let (averages, related_queries, related_topics) = tokio::join!(
        aggregate_averages(api, keywords, params),
        aggregate_related(api, keywords, RelatedKind::Queries, params),
        aggregate_related(api, keywords, RelatedKind::Topics, params),
    );

    let fail = |kind: MetricKind, source: FetchError| {
        warn!(kind = %kind, rate_limited = source.is_rate_limited(), "Group failed");
        GroupFailure {
            group: keywords.to_vec(),
            kind,
            source,
        }
    };

    let averages = averages.map_err(|e| fail(MetricKind::Average, e))?;
    let related_queries = related_queries.map_err(|e| fail(MetricKind::RelatedQueries, e))?;
    let related_topics = related_topics.map_err(|e| fail(MetricKind::RelatedTopics, e))?;

    info!(keywords = keywords.len(), "Group assembled");

    Ok(GroupResult {
        keywords: group.clone(),
        averages,
        related_queries,
        related_topics,
        window: params.window,
        region: params.region.clone(),
        locale: params.locale,
    })
}
