//! In-memory [`TrendApi`] for exercising the pipeline without a network.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::UpstreamError;
use crate::services::trend_api::{RankedItem, RankedList, RankedSection, Topic, TrendApi};
use crate::trends::language::Locale;
use crate::trends::types::{MetricKind, QueryParams, TimeWindow};

pub fn kw(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

pub fn params() -> QueryParams {
    QueryParams {
        window: TimeWindow::months_ending(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), 10),
        region: "SG".to_string(),
        locale: Locale::English,
    }
}

#[derive(Default)]
pub struct FakeTrends {
    averages: HashMap<String, u32>,
    raw_averages: Option<Vec<u32>>,
    queries: HashMap<String, Vec<String>>,
    topics: HashMap<String, Vec<String>>,
    failures: HashMap<(MetricKind, String), UpstreamError>,
    average_batches: Mutex<Vec<Vec<String>>>,
    related_calls: Mutex<usize>,
}

impl FakeTrends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_average(mut self, keyword: &str, score: u32) -> Self {
        self.averages.insert(keyword.to_string(), score);
        self
    }

    /// Returns exactly these values for every averages call.
    pub fn with_raw_averages(mut self, values: Vec<u32>) -> Self {
        self.raw_averages = Some(values);
        self
    }

    pub fn with_queries(mut self, keyword: &str, items: &[&str]) -> Self {
        self.queries.insert(keyword.to_string(), kw(items));
        self
    }

    pub fn with_topics(mut self, keyword: &str, items: &[&str]) -> Self {
        self.topics.insert(keyword.to_string(), kw(items));
        self
    }

    pub fn failing_averages_for(self, keyword: &str, err: UpstreamError) -> Self {
        self.failing(MetricKind::Average, keyword, err)
    }

    pub fn failing_queries_for(self, keyword: &str, err: UpstreamError) -> Self {
        self.failing(MetricKind::RelatedQueries, keyword, err)
    }

    pub fn failing_topics_for(self, keyword: &str, err: UpstreamError) -> Self {
        self.failing(MetricKind::RelatedTopics, keyword, err)
    }

    fn failing(mut self, kind: MetricKind, keyword: &str, err: UpstreamError) -> Self {
        self.failures.insert((kind, keyword.to_string()), err);
        self
    }

    pub fn average_batches(&self) -> Vec<Vec<String>> {
        self.average_batches.lock().unwrap().clone()
    }

    pub fn related_calls(&self) -> usize {
        *self.related_calls.lock().unwrap()
    }

    fn check(&self, kind: MetricKind, keyword: &str) -> Result<(), UpstreamError> {
        match self.failures.get(&(kind, keyword.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn ranked(items: Option<&Vec<String>>, kind: MetricKind) -> RankedList {
        let ranked_keyword = items
            .into_iter()
            .flatten()
            .map(|title| RankedItem {
                query: (kind == MetricKind::RelatedQueries).then(|| title.clone()),
                topic: (kind == MetricKind::RelatedTopics).then(|| Topic {
                    mid: None,
                    title: title.clone(),
                    kind: None,
                }),
                value: None,
                formatted_value: None,
            })
            .collect();
        vec![RankedSection { ranked_keyword }, RankedSection::default()]
    }
}

#[async_trait]
impl TrendApi for FakeTrends {
    async fn interest_over_time(
        &self,
        keywords: &[String],
        _params: &QueryParams,
    ) -> Result<Vec<u32>, UpstreamError> {
        self.average_batches.lock().unwrap().push(keywords.to_vec());
        for k in keywords {
            self.check(MetricKind::Average, k)?;
        }
        if let Some(raw) = &self.raw_averages {
            return Ok(raw.clone());
        }
        Ok(keywords
            .iter()
            .map(|k| self.averages.get(k).copied().unwrap_or(0))
            .collect())
    }

    async fn related_queries(
        &self,
        keyword: &str,
        _params: &QueryParams,
    ) -> Result<RankedList, UpstreamError> {
        *self.related_calls.lock().unwrap() += 1;
        self.check(MetricKind::RelatedQueries, keyword)?;
        Ok(Self::ranked(self.queries.get(keyword), MetricKind::RelatedQueries))
    }

    async fn related_topics(
        &self,
        keyword: &str,
        _params: &QueryParams,
    ) -> Result<RankedList, UpstreamError> {
        *self.related_calls.lock().unwrap() += 1;
        self.check(MetricKind::RelatedTopics, keyword)?;
        Ok(Self::ranked(self.topics.get(keyword), MetricKind::RelatedTopics))
    }
}
