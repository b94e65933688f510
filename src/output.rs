//! Output formatting and persistence for trend results.
//!
//! Renders per-group and aggregate tables for the console and writes the
//! optional report file (CSV ranking or JSON).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{Table, presets::ASCII_FULL};
use csv::WriterBuilder;
use reqwest::Url;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::GroupFailure;
use crate::trends::batcher::MAX_BATCH_SIZE;
use crate::trends::combine::combine;
use crate::trends::types::{AggregateResult, GroupResult, MetricKind, RankedKeyword, RelatedItems};

const EXPLORE_URL: &str = "https://trends.google.com/trends/explore";
const RELATED_SHOWN: usize = 10;

/// Links to the Trends explore page, one per chunk of five keywords.
pub fn explore_urls(group: &GroupResult) -> Vec<String> {
    let date = group.window.as_range();
    group
        .keywords
        .keywords()
        .chunks(MAX_BATCH_SIZE)
        .filter_map(|chunk| {
            Url::parse_with_params(
                EXPLORE_URL,
                &[
                    ("date", date.as_str()),
                    ("geo", group.region.as_str()),
                    ("q", chunk.join(",").as_str()),
                ],
            )
            .ok()
            .map(String::from)
        })
        .collect()
}

/// Keyword list, explore URLs and the ranked table for one group.
pub fn render_group(group: &GroupResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Keywords: {}\n", group.keywords.keywords().join(", "));
    for (i, url) in explore_urls(group).iter().enumerate() {
        let _ = writeln!(out, "URL {} : {}", i + 1, url);
    }
    out.push('\n');

    let ranking = combine(std::slice::from_ref(group)).ranking();
    out.push_str(&render_table(
        &ranking,
        &group.related_queries,
        &group.related_topics,
    ));
    out
}

/// The ranked table across all successful groups.
pub fn render_aggregate(aggregate: &AggregateResult) -> String {
    render_table(
        &aggregate.ranking(),
        &aggregate.related_queries,
        &aggregate.related_topics,
    )
}

/// A one-line explanation of why a group produced no output.
pub fn describe_failure(failure: &GroupFailure) -> String {
    let cause = if failure.is_rate_limited() {
        "too many requests, the trends service is rate limiting".to_string()
    } else {
        failure.source.source.to_string()
    };
    format!(
        "Cannot get trends for [{}] ({}): {}",
        failure.group.join(", "),
        failure.kind,
        cause
    )
}

/// The first few related items, one per line of the cell.
fn top_related(items: &RelatedItems, keyword: &str) -> String {
    items
        .get(keyword)
        .map(|list| {
            list.iter()
                .take(RELATED_SHOWN)
                .cloned()
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn render_table(
    ranking: &[RankedKeyword],
    queries: &RelatedItems,
    topics: &RelatedItems,
) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_header(["s/n", "keyword", "average", "related queries", "related topics"]);
    for (i, entry) in ranking.iter().enumerate() {
        table.add_row([
            (i + 1).to_string(),
            entry.keyword.clone(),
            entry.average.to_string(),
            top_related(queries, &entry.keyword),
            top_related(topics, &entry.keyword),
        ]);
    }
    format!("{table}\n")
}

/// A group that failed, as written to the report.
#[derive(Debug, Serialize)]
pub struct FailureRecord {
    pub group: Vec<String>,
    pub metric: MetricKind,
    pub rate_limited: bool,
    pub error: String,
}

impl From<&GroupFailure> for FailureRecord {
    fn from(failure: &GroupFailure) -> Self {
        Self {
            group: failure.group.clone(),
            metric: failure.kind,
            rate_limited: failure.is_rate_limited(),
            error: failure.source.to_string(),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub groups: Vec<GroupResult>,
    pub failures: Vec<FailureRecord>,
    pub aggregate: AggregateResult,
    pub ranking: Vec<RankedKeyword>,
}

impl Report {
    pub fn new(groups: Vec<GroupResult>, failures: &[GroupFailure]) -> Self {
        let aggregate = combine(&groups);
        let ranking = aggregate.ranking();
        Self {
            generated_at: Utc::now(),
            groups,
            failures: failures.iter().map(FailureRecord::from).collect(),
            aggregate,
            ranking,
        }
    }
}

#[derive(Serialize)]
struct RankingRow<'a> {
    rank: usize,
    keyword: &'a str,
    average: u32,
    related_queries: String,
    related_topics: String,
}

/// Writes the report to `path`: a ranking CSV for `.csv`, pretty JSON otherwise.
pub fn write_report(path: &str, report: &Report) -> Result<()> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    debug!(path, is_csv, "Writing report");

    let file = File::create(path).with_context(|| format!("failed to create {}", path))?;

    if is_csv {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
        for (i, entry) in report.ranking.iter().enumerate() {
            let join = |items: &RelatedItems| {
                items
                    .get(&entry.keyword)
                    .map(|l| l.join("; "))
                    .unwrap_or_default()
            };
            writer.serialize(RankingRow {
                rank: i + 1,
                keyword: &entry.keyword,
                average: entry.average,
                related_queries: join(&report.aggregate.related_queries),
                related_topics: join(&report.aggregate.related_topics),
            })?;
        }
        writer.flush()?;
    } else {
        serde_json::to_writer_pretty(file, report)?;
    }

    info!(path, keywords = report.ranking.len(), "Report written");
    Ok(())
}
