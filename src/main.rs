//! CLI entry point for the trend ranker.
//!
//! Reads keyword groups from a CSV file, fetches interest averages, related
//! queries and related topics for every group, and prints per-group and
//! combined rankings.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trend_ranker::fetch::{BasicClient, ClientOptions};
use trend_ranker::infra::google::{GoogleTrendsClient, GoogleTrendsConfig};
use trend_ranker::output::{Report, describe_failure, render_aggregate, render_group, write_report};
use trend_ranker::parser::parse_keyword_groups;
use trend_ranker::trends::run::{RunSettings, collect_trends, partition};
use trend_ranker::trends::types::TimeWindow;

#[derive(Parser)]
#[command(name = "trend_ranker")]
#[command(about = "Rank keywords by search interest", long_about = None)]
struct Cli {
    /// CSV file with one keyword group per row
    #[arg(short, long, value_name = "FILE")]
    file: String,

    /// Proxy address (host:port or URL) for all upstream requests
    #[arg(short, long, env = "TRENDS_PROXY")]
    proxy: Option<String>,

    /// Write the report here (.csv for a ranking table, JSON otherwise)
    #[arg(short, long)]
    output: Option<String>,

    /// Region code sent with every query
    #[arg(long, default_value = "SG")]
    geo: String,

    /// Length of the time window in months, ending today
    #[arg(long, default_value_t = 10)]
    months: u32,

    /// Upper bound on each upstream request, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Maximum number of upstream requests in flight
    #[arg(short, long, default_value_t = 5)]
    concurrency: usize,

    /// Timezone offset in minutes sent upstream
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    tz: i32,

    /// Exit with an error if any group was rate limited
    #[arg(long, default_value_t = false)]
    abort_on_rate_limit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trend_ranker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trend_ranker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let groups = parse_keyword_groups(&cli.file)
        .with_context(|| format!("failed to load keywords from {}", cli.file))?;
    info!(groups = groups.len(), file = %cli.file, "Keyword groups loaded");

    let http = BasicClient::with_options(&ClientOptions {
        proxy: cli.proxy.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        ..Default::default()
    })
    .context("failed to build HTTP client")?;
    if let Some(proxy) = &cli.proxy {
        info!(proxy = %proxy, "Using proxy");
    }

    let api = GoogleTrendsClient::new(
        http,
        &GoogleTrendsConfig {
            tz_offset_minutes: cli.tz,
            max_in_flight: cli.concurrency,
            ..Default::default()
        },
    )?;

    let settings = RunSettings {
        window: TimeWindow::months_ending(Utc::now().date_naive(), cli.months),
        region: cli.geo.clone(),
    };

    let outcomes = collect_trends(&api, groups, &settings).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                println!("{}", render_group(result));
                println!("*****************************************************\n");
            }
            Err(failure) => {
                error!(group = %failure.group.join(", "), kind = %failure.kind, "{}", failure);
                eprintln!("{}", describe_failure(failure));
            }
        }
    }

    let (results, failures) = partition(outcomes);

    let report = Report::new(results, &failures);
    if !report.groups.is_empty() {
        println!("{}", render_aggregate(&report.aggregate));
    }

    if let Some(path) = &cli.output {
        write_report(path, &report)?;
    }

    let rate_limited = failures.iter().filter(|f| f.is_rate_limited()).count();
    if rate_limited > 0 {
        warn!(rate_limited, "Some groups were rate limited");
        if cli.abort_on_rate_limit {
            bail!("{} group(s) were rate limited by the trends service", rate_limited);
        }
    }

    Ok(())
}
