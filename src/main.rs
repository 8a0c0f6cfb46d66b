// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dispatchrs::config::dispatch::DispatchConfig;
use dispatchrs::config::settings::{DispatcherSettings, Settings};
use dispatchrs::domain::models::batch::BatchReport;
use dispatchrs::domain::models::dispatch_result::Outcome;
use dispatchrs::engines::reqwest_engine::ReqwestEngine;
use dispatchrs::engines::traits::FetchResponse;
use dispatchrs::infrastructure::metrics;
use dispatchrs::queue::source::{
    validate_target, LineFileSource, RepeatSource, StaticSource, WorkSource,
};
use dispatchrs::utils::errors::ItemError;
use dispatchrs::utils::telemetry;
use dispatchrs::workers::dispatcher::Dispatcher;

/// 并发批量请求调度器
#[derive(Parser, Debug)]
#[command(name = "dispatchrs", about = "Fetch a batch of URLs with a bounded worker pool")]
struct Args {
    /// Target URL, may be repeated
    #[arg(long = "url", short = 'u')]
    urls: Vec<String>,

    /// File with one URL per line
    #[arg(long, conflicts_with = "urls")]
    file: Option<PathBuf>,

    /// Number of times each --url is requested
    #[arg(long, default_value_t = 1, conflicts_with = "file")]
    count: usize,

    /// Maximum number of requests in flight
    #[arg(long, short = 'n')]
    concurrency: Option<usize>,

    /// Dispatch mode: pool or paced
    #[arg(long)]
    mode: Option<String>,

    /// Pause between chunks in paced mode (milliseconds)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Per-request timeout (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Deadline for the whole batch (milliseconds)
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// 命令行参数覆盖配置文件
    fn apply(&self, settings: &mut DispatcherSettings) {
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(mode) = &self.mode {
            settings.mode = mode.clone();
        }
        if self.pacing_ms.is_some() {
            settings.pacing_ms = self.pacing_ms;
        }
        if self.timeout_ms.is_some() {
            settings.item_timeout_ms = self.timeout_ms;
        }
        if self.deadline_ms.is_some() {
            settings.deadline_ms = self.deadline_ms;
        }
    }

    fn source(&self) -> anyhow::Result<Box<dyn WorkSource>> {
        if let Some(path) = &self.file {
            return Ok(Box::new(LineFileSource::new(path)));
        }

        if self.urls.is_empty() {
            bail!("no targets given, use --url or --file");
        }
        for url in &self.urls {
            validate_target(url).map_err(anyhow::Error::msg)?;
        }

        if let [url] = self.urls.as_slice() {
            return Ok(Box::new(RepeatSource::new(url.clone(), self.count)));
        }

        let targets = self
            .urls
            .iter()
            .flat_map(|url| std::iter::repeat(url.clone()).take(self.count));
        Ok(Box::new(StaticSource::new(targets)))
    }
}

#[derive(Serialize)]
struct ResultLine<'a> {
    id: usize,
    target: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct Summary {
    batch_id: String,
    total: usize,
    succeeded: usize,
    failed: usize,
    cancelled: usize,
    elapsed_ms: i64,
}

fn print_report(report: &BatchReport<FetchResponse>, json: bool) -> anyhow::Result<()> {
    for result in &report.results {
        let (outcome, status, bytes, error) = match &result.outcome {
            Outcome::Success(response) => (
                "success",
                Some(response.status_code),
                Some(response.content_length),
                None,
            ),
            Outcome::Failure(e) => {
                let status = match e {
                    ItemError::Status(code) => Some(*code),
                    _ => None,
                };
                ("failure", status, None, Some(e.to_string()))
            }
        };

        let line = ResultLine {
            id: result.item.id,
            target: &result.item.target,
            outcome,
            status,
            bytes,
            elapsed_ms: result.elapsed_ms(),
            error,
        };

        if json {
            println!("{}", serde_json::to_string(&line)?);
        } else {
            match (&line.error, line.status) {
                (None, Some(status)) => println!(
                    "#{} {} -> {} ({} bytes, {}ms)",
                    line.id,
                    line.target,
                    status,
                    line.bytes.unwrap_or(0),
                    line.elapsed_ms
                ),
                (Some(error), _) => println!("#{} {} failed: {}", line.id, line.target, error),
                (None, None) => println!("#{} {}", line.id, line.target),
            }
        }
    }

    let summary = Summary {
        batch_id: report.batch.id.to_string(),
        total: report.len(),
        succeeded: report.succeeded(),
        failed: report.failed(),
        cancelled: report.cancelled_count(),
        elapsed_ms: report
            .batch
            .finished_at
            .map(|end| (end - report.batch.started_at).num_milliseconds())
            .unwrap_or(0),
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "{} requests: {} succeeded, {} failed ({} cancelled) in {}ms",
            summary.total, summary.succeeded, summary.failed, summary.cancelled, summary.elapsed_ms
        );
    }
    Ok(())
}

/// 主函数
///
/// 解析命令行参数，构建工作源和调度器，执行一个批次并输出结果
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Settings::new()?,
    };
    args.apply(&mut settings.dispatcher);

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(&settings.telemetry);
    metrics::init_metrics(&settings.metrics);

    // 3. Build dispatcher
    let config = DispatchConfig::try_from(&settings.dispatcher)?;
    let engine = ReqwestEngine::new(&settings.http)?;
    let dispatcher = Dispatcher::new(engine, config)?;
    let source = args.source()?;

    // 4. Ctrl-C cancels the batch, completed results are still reported
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            interrupt.cancel();
        }
    });

    info!("Starting dispatch...");
    let report = dispatcher.run_source(source.as_ref(), cancel).await?;
    print_report(&report, args.json)?;

    Ok(())
}
