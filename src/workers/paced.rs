// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::dispatch::DispatchConfig;
use crate::domain::models::dispatch_result::{DispatchResult, Outcome};
use crate::domain::models::work_item::WorkItem;
use crate::engines::traits::Operation;
use crate::infrastructure::metrics::record_result;
use crate::queue::source::WorkStream;
use crate::utils::errors::ItemError;
use crate::workers::worker::execute_item;

/// 分块节流调度
///
/// 把工作项切分为大小为 N 的块，块内并发执行并等待全部完成，
/// 然后等待节流间隔再执行下一块。块之间从不重叠，最后一块之后不等待。
pub(crate) async fn run_paced<O: Operation>(
    operation: Arc<O>,
    mut stream: WorkStream,
    config: &DispatchConfig,
    cancel: &CancellationToken,
) -> Vec<DispatchResult<O::Output>> {
    let mut results = Vec::new();
    let mut chunk_index = 0usize;

    loop {
        let chunk: Vec<WorkItem> = stream.by_ref().take(config.concurrency).collect();
        if chunk.is_empty() {
            break;
        }

        if chunk_index > 0 {
            if let Some(pacing) = config.pacing {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(pacing) => {}
                }
            }
        }

        if cancel.is_cancelled() {
            for item in chunk {
                let result = DispatchResult::cancelled(item);
                record_result(&result);
                results.push(result);
            }
            chunk_index += 1;
            continue;
        }

        let size = chunk.len();
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(size);

        for item in chunk {
            let operation = operation.clone();
            let cancel = cancel.clone();
            let timeout = config.item_timeout;
            let task_item = item.clone();
            let handle = tasks.spawn(async move {
                execute_item(operation.as_ref(), task_item, timeout, &cancel).await
            });
            pending.insert(handle.id(), item);
        }

        // Barrier: the next chunk starts only after every task here has joined
        while let Some(joined) = tasks.join_next_with_id().await {
            let result = match joined {
                Ok((id, result)) => {
                    pending.remove(&id);
                    result
                }
                Err(e) => {
                    error!("Chunk task failed: {}", e);
                    match pending.remove(&e.id()) {
                        Some(item) => DispatchResult::new(
                            item,
                            Outcome::Failure(ItemError::Other(e.to_string())),
                            Duration::ZERO,
                        ),
                        None => continue,
                    }
                }
            };
            record_result(&result);
            results.push(result);
        }

        debug!(chunk = chunk_index, size, "Chunk completed");
        chunk_index += 1;
    }

    results
}

#[cfg(test)]
#[path = "paced_test.rs"]
mod tests;
