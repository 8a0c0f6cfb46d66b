// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::dispatch::{DispatchConfig, DispatchMode};
use crate::domain::models::batch::{Batch, BatchReport};
use crate::domain::models::dispatch_result::{DispatchResult, Outcome};
use crate::domain::models::work_item::WorkItem;
use crate::engines::traits::Operation;
use crate::infrastructure::metrics::{record_result, BATCHES_TOTAL};
use crate::queue::source::{WorkSource, WorkStream};
use crate::utils::errors::{DispatchError, ItemError};
use crate::workers::paced;
use crate::workers::worker::Worker;

/// 调度器
///
/// 以至多 N 个并发执行槽位运行一个批次，为每个工作项恰好产生一个结果。
/// 单个工作项的失败不会中止其他工作项。
pub struct Dispatcher<O: Operation> {
    operation: Arc<O>,
    config: DispatchConfig,
}

impl<O: Operation> Dispatcher<O> {
    /// 创建新的调度器
    ///
    /// # 返回值
    ///
    /// * `Ok(Dispatcher)` - 配置有效
    /// * `Err(DispatchError::Config)` - 配置无效，此时不会启动任何工作器
    pub fn new(operation: O, config: DispatchConfig) -> Result<Self, DispatchError> {
        Self::with_shared(Arc::new(operation), config)
    }

    /// 使用共享的操作实例创建调度器
    pub fn with_shared(operation: Arc<O>, config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { operation, config })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 执行一个批次
    ///
    /// 返回的结果数量与 `items` 相同，顺序为完成顺序
    pub async fn run(&self, items: Vec<WorkItem>) -> BatchReport<O::Output> {
        self.run_with_cancel(items, CancellationToken::new()).await
    }

    /// 执行一个可取消的批次
    ///
    /// 取消后不再派发新的工作项；执行中和尚未派发的工作项记为
    /// `Failure(Cancelled)`，已完成的结果保留
    pub async fn run_with_cancel(
        &self,
        items: Vec<WorkItem>,
        cancel: CancellationToken,
    ) -> BatchReport<O::Output> {
        let size = items.len();
        self.dispatch(Box::new(items.into_iter()), Some(size), cancel)
            .await
    }

    /// 从工作源执行一个批次
    ///
    /// 工作源在任何工作器启动之前被展开，格式错误会立即返回
    pub async fn run_source(
        &self,
        source: &dyn WorkSource,
        cancel: CancellationToken,
    ) -> Result<BatchReport<O::Output>, DispatchError> {
        let stream = source.produce()?;
        Ok(self.dispatch(stream, source.size_hint(), cancel).await)
    }

    async fn dispatch(
        &self,
        stream: WorkStream,
        size: Option<usize>,
        external: CancellationToken,
    ) -> BatchReport<O::Output> {
        let mut batch = Batch::start(size.unwrap_or(0), self.config.concurrency);
        counter!(BATCHES_TOTAL).increment(1);
        info!(
            batch_id = %batch.id,
            size = ?size,
            concurrency = self.config.concurrency,
            mode = %self.config.mode,
            "Batch started"
        );

        // Deadline cancels only this batch, never the caller's token
        let cancel = external.child_token();
        let done = CancellationToken::new();
        let deadline = watch_deadline(self.config.deadline, cancel.clone(), done.clone());

        let run = async {
            let results = match self.config.mode {
                DispatchMode::Pool => self.run_pool(stream, size, &cancel).await,
                DispatchMode::Paced => {
                    paced::run_paced(self.operation.clone(), stream, &self.config, &cancel).await
                }
            };
            let cancelled = cancel.is_cancelled();
            done.cancel();
            (results, cancelled)
        };

        let ((results, cancelled), ()) = tokio::join!(run, deadline);

        batch.complete(results.len());
        let report = BatchReport {
            batch,
            results,
            cancelled,
        };

        info!(
            batch_id = %report.batch.id,
            size = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled = report.cancelled,
            "Batch complete"
        );
        report
    }

    /// 常驻工作池
    ///
    /// 启动 min(N, len) 个工作器共享一个有界入口队列；投递方把全部工作项
    /// 推入队列后关闭它；聚合方恰好取回与工作项数量相同的结果。
    ///
    /// 启动前先从工作源预取至多 N 个工作项，工作器数量和入口队列容量都
    /// 以实际预取的数量为准，因此远大于工作项数量的 N 不会预留多余资源。
    async fn run_pool(
        &self,
        mut stream: WorkStream,
        size: Option<usize>,
        cancel: &CancellationToken,
    ) -> Vec<DispatchResult<O::Output>> {
        let concurrency = self.config.concurrency;
        let head: Vec<WorkItem> = stream.by_ref().take(concurrency).collect();
        if head.is_empty() {
            return Vec::new();
        }

        // A short prefix means the source is already exhausted
        let worker_count = head.len();
        let size = match size {
            None if worker_count < concurrency => Some(worker_count),
            known => known,
        };
        let stream = head.into_iter().chain(stream);

        let (intake_tx, intake_rx) = async_channel::bounded::<WorkItem>(worker_count);
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<DispatchResult<O::Output>>();
        let (total_tx, mut total_rx) = oneshot::channel::<usize>();

        let mut workers = JoinSet::new();
        for slot in 0..worker_count {
            let worker = Worker::new(
                slot,
                self.operation.clone(),
                intake_rx.clone(),
                result_tx.clone(),
                self.config.item_timeout,
                cancel.clone(),
            );
            workers.spawn(worker.run());
        }
        drop(intake_rx);
        debug!(workers = worker_count, "Worker pool started");

        let feeder = async move {
            let mut fed = 0usize;
            for item in stream {
                fed += 1;
                if cancel.is_cancelled() {
                    let _ = result_tx.send(DispatchResult::cancelled(item));
                    continue;
                }

                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ItemError::Cancelled),
                    sent = intake_tx.send(item.clone()) => sent.map_err(|_| {
                        ItemError::Other("worker pool intake closed".to_string())
                    }),
                };

                if let Err(e) = sent {
                    let _ = result_tx.send(DispatchResult::new(
                        item,
                        Outcome::Failure(e),
                        Duration::ZERO,
                    ));
                }
            }
            // Closing the intake lets workers drain and exit
            intake_tx.close();
            let _ = total_tx.send(fed);
        };

        let aggregator = async {
            let mut results = Vec::with_capacity(size.unwrap_or(0));
            let mut expected = size;

            loop {
                if expected.is_some_and(|n| results.len() >= n) {
                    break;
                }

                tokio::select! {
                    received = result_rx.recv() => match received {
                        Some(result) => {
                            record_result(&result);
                            results.push(result);
                        }
                        None => {
                            // Every sender is gone, no further result can arrive
                            if expected.is_some_and(|n| results.len() < n) {
                                error!(
                                    received = results.len(),
                                    expected = ?expected,
                                    "Result channel closed before every item reported"
                                );
                            }
                            break;
                        }
                    },
                    total = &mut total_rx, if expected.is_none() => {
                        expected = Some(total.unwrap_or(usize::MAX));
                    }
                }
            }
            results
        };

        let ((), results) = tokio::join!(feeder, aggregator);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {}", e);
            }
        }

        results
    }
}

async fn watch_deadline(
    deadline: Option<Duration>,
    cancel: CancellationToken,
    done: CancellationToken,
) {
    let Some(deadline) = deadline else {
        return;
    };

    tokio::select! {
        _ = done.cancelled() => {}
        _ = tokio::time::sleep(deadline) => {
            warn!(
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                "Batch deadline reached, cancelling"
            );
            cancel.cancel();
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
