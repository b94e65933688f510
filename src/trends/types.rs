//! Data types shared by the trend pipeline.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::InputError;
use crate::trends::language::Locale;

/// Keyword → interest score (0–100).
pub type Scores = BTreeMap<String, u32>;

/// Keyword → ordered related queries or topic titles.
pub type RelatedItems = BTreeMap<String, Vec<String>>;

/// One logical set of search terms analyzed together, typically one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordGroup(Vec<String>);

impl KeywordGroup {
    pub fn new(keywords: Vec<String>) -> Result<Self, InputError> {
        if keywords.is_empty() || keywords.iter().any(|k| k.is_empty()) {
            return Err(InputError::EmptyGroup);
        }
        Ok(Self(keywords))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The three analytics the upstream service exposes per keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Average,
    RelatedQueries,
    RelatedTopics,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [
        MetricKind::Average,
        MetricKind::RelatedQueries,
        MetricKind::RelatedTopics,
    ];
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Average => "average",
            MetricKind::RelatedQueries => "related queries",
            MetricKind::RelatedTopics => "related topics",
        };
        f.write_str(name)
    }
}

/// Keyword-keyed values for one metric kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricResult {
    Average(Scores),
    RelatedQueries(RelatedItems),
    RelatedTopics(RelatedItems),
}

impl MetricResult {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricResult::Average(_) => MetricKind::Average,
            MetricResult::RelatedQueries(_) => MetricKind::RelatedQueries,
            MetricResult::RelatedTopics(_) => MetricKind::RelatedTopics,
        }
    }

    pub fn contains(&self, keyword: &str) -> bool {
        match self {
            MetricResult::Average(scores) => scores.contains_key(keyword),
            MetricResult::RelatedQueries(items) | MetricResult::RelatedTopics(items) => {
                items.contains_key(keyword)
            }
        }
    }
}

/// The two metrics served as ranked lists, one keyword per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelatedKind {
    Queries,
    Topics,
}

impl RelatedKind {
    pub fn metric(self) -> MetricKind {
        match self {
            RelatedKind::Queries => MetricKind::RelatedQueries,
            RelatedKind::Topics => MetricKind::RelatedTopics,
        }
    }
}

impl fmt::Display for RelatedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.metric().fmt(f)
    }
}

/// Keyword → score union. Last write wins.
pub fn merge_scores(into: &mut Scores, from: Scores) {
    into.extend(from);
}

/// Keyword → list union. Last write wins; lists are replaced, never concatenated.
pub fn merge_related(into: &mut RelatedItems, from: RelatedItems) {
    into.extend(from);
}

/// Inclusive date range the interest data covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// The `months` months ending at `end`.
    pub fn months_ending(end: NaiveDate, months: u32) -> Self {
        let start = end.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// `YYYY-MM-DD YYYY-MM-DD`, the form the trends service and explore URLs use.
    pub fn as_range(&self) -> String {
        format!(
            "{} {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Parameters sent with every upstream call for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub window: TimeWindow,
    pub region: String,
    pub locale: Locale,
}

impl QueryParams {
    /// Locale is picked from the group's first keyword.
    pub fn for_group(group: &KeywordGroup, window: TimeWindow, region: &str) -> Self {
        let locale = group
            .keywords()
            .first()
            .map(|k| Locale::classify(k))
            .unwrap_or_default();
        Self {
            window,
            region: region.to_string(),
            locale,
        }
    }
}

/// Fully assembled metrics for one keyword group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    pub keywords: KeywordGroup,
    pub averages: Scores,
    pub related_queries: RelatedItems,
    pub related_topics: RelatedItems,
    pub window: TimeWindow,
    pub region: String,
    pub locale: Locale,
}

impl GroupResult {
    /// Per-metric view of this group's data.
    pub fn metric(&self, kind: MetricKind) -> MetricResult {
        match kind {
            MetricKind::Average => MetricResult::Average(self.averages.clone()),
            MetricKind::RelatedQueries => MetricResult::RelatedQueries(self.related_queries.clone()),
            MetricKind::RelatedTopics => MetricResult::RelatedTopics(self.related_topics.clone()),
        }
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedKeyword {
    pub keyword: String,
    pub average: u32,
}

/// Union of many groups, used for cross-group ranking.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateResult {
    /// Distinct keywords in discovery order.
    pub keywords: Vec<String>,
    pub averages: Scores,
    pub related_queries: RelatedItems,
    pub related_topics: RelatedItems,
}
