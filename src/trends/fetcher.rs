//! One upstream call for one metric: averages per batch, related lists per
//! keyword.

use tracing::debug;

use crate::error::{FetchError, UpstreamError};
use crate::services::trend_api::{RankedList, TrendApi};
use crate::trends::types::{MetricKind, QueryParams, RelatedKind, Scores};

/// Interest averages for one batch, padded with 0 when the service returns
/// fewer values than keywords.
#[tracing::instrument(skip(api, params), fields(batch_size = batch.len()))]
pub async fn fetch_averages<A: TrendApi + ?Sized>(
    api: &A,
    batch: &[String],
    params: &QueryParams,
) -> Result<Scores, FetchError> {
    let mut values = api
        .interest_over_time(batch, params)
        .await
        .map_err(|e| FetchError::new(MetricKind::Average, batch, e))?;

    if values.len() < batch.len() {
        debug!(
            returned = values.len(),
            requested = batch.len(),
            "Padding short averages with zeros"
        );
        values.resize(batch.len(), 0);
    }

    Ok(batch.iter().cloned().zip(values).collect())
}

/// Related queries or topic titles for a single keyword.
#[tracing::instrument(skip(api, kind, params), fields(kind = %kind))]
pub async fn fetch_related<A: TrendApi + ?Sized>(
    api: &A,
    keyword: &str,
    kind: RelatedKind,
    params: &QueryParams,
) -> Result<Vec<String>, FetchError> {
    let tag = |e| FetchError::new(kind.metric(), &[keyword.to_string()], e);

    let ranked = match kind {
        RelatedKind::Queries => api.related_queries(keyword, params).await,
        RelatedKind::Topics => api.related_topics(keyword, params).await,
    }
    .map_err(tag)?;

    let items = flatten_ranked(&ranked, kind).map_err(tag)?;
    debug!(items = items.len(), "Related items fetched");
    Ok(items)
}

/// Flattens every section of a ranked list into item titles, in order.
pub fn flatten_ranked(ranked: &RankedList, kind: RelatedKind) -> Result<Vec<String>, UpstreamError> {
    ranked
        .iter()
        .flat_map(|section| section.ranked_keyword.iter())
        .map(|item| {
            let title = match kind {
                RelatedKind::Queries => item.query.clone(),
                RelatedKind::Topics => item.topic.as_ref().map(|t| t.title.clone()),
            };
            title.ok_or_else(|| {
                UpstreamError::MalformedResponse(format!("ranked {kind} item without a title"))
            })
        })
        .collect()
}
