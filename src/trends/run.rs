//! Top-level orchestration across all keyword groups.

use futures::future::join_all;
use tracing::info;

use crate::error::GroupFailure;
use crate::services::trend_api::TrendApi;
use crate::trends::assemble::assemble;
use crate::trends::types::{GroupResult, KeywordGroup, QueryParams, TimeWindow};

/// Settings shared by every group in a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub window: TimeWindow,
    pub region: String,
}

/// The result of one group, paired with the group it came from.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: KeywordGroup,
    pub result: Result<GroupResult, GroupFailure>,
}

/// Assembles every group concurrently.
///
/// Outcomes are returned in input order regardless of completion order. A
/// failed group never stops its siblings.
#[tracing::instrument(skip_all, fields(groups = groups.len(), region = %settings.region))]
pub async fn collect_trends<A: TrendApi + ?Sized>(
    api: &A,
    groups: Vec<KeywordGroup>,
    settings: &RunSettings,
) -> Vec<GroupOutcome> {
    let results = join_all(groups.iter().map(|group| async move {
        let params = QueryParams::for_group(group, settings.window, &settings.region);
        assemble(api, group, &params).await
    }))
    .await;

    let outcomes: Vec<GroupOutcome> = groups
        .into_iter()
        .zip(results)
        .map(|(group, result)| GroupOutcome { group, result })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        succeeded = outcomes.len() - failed,
        failed, "Trend collection finished"
    );
    outcomes
}

/// Splits outcomes into successful groups and failures, keeping input order.
pub fn partition(outcomes: Vec<GroupOutcome>) -> (Vec<GroupResult>, Vec<GroupFailure>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => ok.push(result),
            Err(failure) => failed.push(failure),
        }
    }
    (ok, failed)
}
