use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::UpstreamError;
use crate::fetch::{HttpClient, get_text};
use crate::services::trend_api::{RankedList, TrendApi};
use crate::trends::types::QueryParams;

const TIMESERIES_WIDGET: &str = "TIMESERIES";
const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";
const RELATED_TOPICS_WIDGET: &str = "RELATED_TOPICS";

#[derive(Debug, Clone)]
pub struct GoogleTrendsConfig {
    pub base_url: String,
    /// Timezone offset in minutes, sent as `tz`.
    pub tz_offset_minutes: i32,
    /// Upper bound on concurrent requests to the service.
    pub max_in_flight: usize,
}

impl Default for GoogleTrendsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trends.google.com".to_string(),
            tz_offset_minutes: 0,
            max_in_flight: 5,
        }
    }
}

#[derive(Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Value,
}

#[derive(Deserialize)]
struct WidgetData<T> {
    default: T,
}

#[derive(Deserialize)]
struct Timeline {
    #[serde(default)]
    averages: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedSearches {
    #[serde(default)]
    ranked_list: RankedList,
}

/// Talks to the Google Trends web API.
///
/// Every query is two calls: an explore call that returns widget tokens, then
/// a widget-data call using the token of the widget for the wanted metric.
pub struct GoogleTrendsClient<C> {
    http: C,
    base_url: Url,
    tz: String,
    permits: Arc<Semaphore>,
}

impl<C: HttpClient> GoogleTrendsClient<C> {
    pub fn new(http: C, config: &GoogleTrendsConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).context("invalid trends base URL")?;

        Ok(Self {
            http,
            base_url,
            tz: config.tz_offset_minutes.to_string(),
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| UpstreamError::Transport(format!("invalid request URL: {}", e)))?;
        url.query_pairs_mut().extend_pairs(query);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| UpstreamError::Transport("request pool closed".to_string()))?;

        debug!(path = url.path(), "Upstream request");
        let (status, body) = get_text(&self.http, url).await.map_err(transport_error)?;
        check_status(status, body)
    }

    async fn explore(
        &self,
        keywords: &[String],
        params: &QueryParams,
    ) -> Result<Vec<Widget>, UpstreamError> {
        let time = params.window.as_range();
        let items: Vec<Value> = keywords
            .iter()
            .map(|keyword| {
                let mut item = Map::new();
                item.insert("keyword".into(), json!(keyword));
                if !params.region.is_empty() {
                    item.insert("geo".into(), json!(params.region));
                }
                item.insert("time".into(), json!(time));
                Value::Object(item)
            })
            .collect();
        let req = json!({ "comparisonItem": items, "category": 0, "property": "" }).to_string();

        let body = self
            .get(
                "trends/api/explore",
                &[
                    ("hl", params.locale.code()),
                    ("tz", self.tz.as_str()),
                    ("req", req.as_str()),
                ],
            )
            .await?;
        let explore: ExploreResponse = parse_json(&body)?;
        Ok(explore.widgets)
    }

    async fn widget_data<T: DeserializeOwned>(
        &self,
        widgets: &[Widget],
        widget_id: &str,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<T, UpstreamError> {
        let (widget, token) = widgets
            .iter()
            .find_map(|w| {
                w.token
                    .as_deref()
                    .filter(|_| w.id.starts_with(widget_id))
                    .map(|token| (w, token))
            })
            .ok_or_else(|| {
                UpstreamError::MalformedResponse(format!("explore returned no {} widget", widget_id))
            })?;

        let req = widget.request.to_string();
        let body = self
            .get(
                &format!("trends/api/widgetdata/{}", endpoint),
                &[
                    ("hl", params.locale.code()),
                    ("tz", self.tz.as_str()),
                    ("req", req.as_str()),
                    ("token", token),
                ],
            )
            .await?;
        let data: WidgetData<T> = parse_json(&body)?;
        Ok(data.default)
    }

    async fn related(
        &self,
        keyword: &str,
        widget_id: &str,
        params: &QueryParams,
    ) -> Result<RankedList, UpstreamError> {
        let widgets = self.explore(&[keyword.to_string()], params).await?;
        let related: RelatedSearches = self
            .widget_data(&widgets, widget_id, "relatedsearches", params)
            .await?;
        Ok(related.ranked_list)
    }
}

#[async_trait]
impl<C: HttpClient> TrendApi for GoogleTrendsClient<C> {
    async fn interest_over_time(
        &self,
        keywords: &[String],
        params: &QueryParams,
    ) -> Result<Vec<u32>, UpstreamError> {
        let widgets = self.explore(keywords, params).await?;
        let timeline: Timeline = self
            .widget_data(&widgets, TIMESERIES_WIDGET, "multiline", params)
            .await?;
        Ok(timeline.averages)
    }

    async fn related_queries(
        &self,
        keyword: &str,
        params: &QueryParams,
    ) -> Result<RankedList, UpstreamError> {
        self.related(keyword, RELATED_QUERIES_WIDGET, params).await
    }

    async fn related_topics(
        &self,
        keyword: &str,
        params: &QueryParams,
    ) -> Result<RankedList, UpstreamError> {
        self.related(keyword, RELATED_TOPICS_WIDGET, params).await
    }
}

fn transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Transport(format!("request timed out: {}", e))
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

/// Maps throttling to [`UpstreamError::RateLimited`] and other failures to
/// [`UpstreamError::Transport`].
fn check_status(status: StatusCode, body: String) -> Result<String, UpstreamError> {
    if status.is_success() {
        return Ok(body);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || body.to_lowercase().contains("too many") {
        return Err(UpstreamError::RateLimited(format!("status {}", status)));
    }
    let snippet: String = body.chars().take(200).collect();
    Err(UpstreamError::Transport(format!(
        "status {}: {}",
        status, snippet
    )))
}

/// Responses are prefixed with `)]}'` (sometimes followed by a comma) to
/// defeat JSON hijacking.
fn strip_xssi_prefix(body: &str) -> &str {
    let body = body.trim_start();
    match body.strip_prefix(")]}'") {
        Some(rest) => rest.trim_start_matches(',').trim_start(),
        None => body,
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, UpstreamError> {
    serde_json::from_str(strip_xssi_prefix(body))
        .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))
}
