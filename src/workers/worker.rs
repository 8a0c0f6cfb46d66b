// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::FutureExt;
use metrics::gauge;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::domain::models::dispatch_result::{DispatchResult, Outcome};
use crate::domain::models::work_item::WorkItem;
use crate::engines::traits::Operation;
use crate::infrastructure::metrics::IN_FLIGHT;
use crate::utils::errors::ItemError;

/// 对单个工作项执行操作
///
/// 操作的失败、超时、panic 和取消都会被转换为 `Failure` 结果，
/// 因此每次调用恰好返回一个结果。
pub async fn execute_item<O: Operation>(
    operation: &O,
    item: WorkItem,
    item_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> DispatchResult<O::Output> {
    if cancel.is_cancelled() {
        return DispatchResult::cancelled(item);
    }

    let start = Instant::now();
    gauge!(IN_FLIGHT).increment(1.0);

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Outcome::Failure(ItemError::Cancelled),
        outcome = guarded_call(operation, &item, item_timeout) => outcome,
    };

    gauge!(IN_FLIGHT).decrement(1.0);

    if let Outcome::Failure(e) = &outcome {
        debug!(item_id = item.id, target = %item.target, error = %e, "Item failed");
    }

    DispatchResult::new(item, outcome, start.elapsed())
}

async fn guarded_call<O: Operation>(
    operation: &O,
    item: &WorkItem,
    item_timeout: Option<Duration>,
) -> Outcome<O::Output> {
    let call = AssertUnwindSafe(operation.execute(item)).catch_unwind();

    let caught = match item_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(caught) => caught,
            Err(_) => return Outcome::Failure(ItemError::Timeout(limit)),
        },
        None => call.await,
    };

    match caught {
        Ok(result) => result.into(),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(
                item_id = item.id,
                operation = operation.name(),
                "Operation panicked: {}",
                message
            );
            Outcome::Failure(ItemError::Panicked(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 工作池中的一个槽位
///
/// 循环从共享入口队列拉取工作项，执行后把结果推入共享输出队列；
/// 入口关闭且取空后退出。不在工作项之间保留任何状态。
pub struct Worker<O: Operation> {
    slot: usize,
    operation: Arc<O>,
    intake: async_channel::Receiver<WorkItem>,
    output: mpsc::UnboundedSender<DispatchResult<O::Output>>,
    item_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<O: Operation> Worker<O> {
    pub fn new(
        slot: usize,
        operation: Arc<O>,
        intake: async_channel::Receiver<WorkItem>,
        output: mpsc::UnboundedSender<DispatchResult<O::Output>>,
        item_timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            slot,
            operation,
            intake,
            output,
            item_timeout,
            cancel,
        }
    }

    /// 运行工作器，返回处理的工作项数量
    #[instrument(skip(self), fields(slot = self.slot, operation = self.operation.name()))]
    pub async fn run(self) -> usize {
        let mut processed = 0;

        while let Ok(item) = self.intake.recv().await {
            let result =
                execute_item(self.operation.as_ref(), item, self.item_timeout, &self.cancel).await;
            processed += 1;

            if self.output.send(result).is_err() {
                // Aggregator is gone, nobody will read further results
                warn!("Result channel closed, worker exiting early");
                break;
            }
        }

        debug!(processed, "Worker finished");
        processed
    }
}
