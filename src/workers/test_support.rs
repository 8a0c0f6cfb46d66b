// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::models::dispatch_result::DispatchResult;
use crate::domain::models::work_item::WorkItem;
use crate::engines::traits::Operation;
use crate::utils::errors::ItemError;

/// 带计数的模拟操作，记录并发峰值和每次调用的开始时间
#[derive(Default)]
pub(crate) struct Probe {
    pub delay: Duration,
    pub fail_all: bool,
    pub fail_ids: HashSet<usize>,
    pub hang_ids: HashSet<usize>,
    pub panic_ids: HashSet<usize>,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub starts: Mutex<Vec<(usize, Instant)>>,
}

impl Probe {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn failing(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.fail_ids.extend(ids);
        self
    }

    pub fn hanging(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.hang_ids.extend(ids);
        self
    }

    pub fn panicking(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.panic_ids.extend(ids);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn start_of(&self, id: usize) -> Option<Instant> {
        self.starts
            .lock()
            .unwrap()
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, at)| *at)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Operation for Probe {
    type Output = usize;

    async fn execute(&self, item: &WorkItem) -> Result<usize, ItemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().unwrap().push((item.id, Instant::now()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if self.hang_ids.contains(&item.id) {
            std::future::pending::<()>().await;
        }
        if self.panic_ids.contains(&item.id) {
            panic!("probe panic on item {}", item.id);
        }

        tokio::time::sleep(self.delay).await;

        if self.fail_all || self.fail_ids.contains(&item.id) {
            return Err(ItemError::Status(500));
        }
        Ok(item.id)
    }

    fn name(&self) -> &'static str {
        "probe"
    }
}

pub(crate) fn items(count: usize) -> Vec<WorkItem> {
    (0..count)
        .map(|id| WorkItem::new(id, format!("https://probe.test/{}", id)))
        .collect()
}

pub(crate) fn sorted_ids<T>(results: &[DispatchResult<T>]) -> Vec<usize> {
    let mut ids: Vec<usize> = results.iter().map(|r| r.item.id).collect();
    ids.sort_unstable();
    ids
}

pub(crate) fn shared(probe: Probe) -> Arc<Probe> {
    Arc::new(probe)
}
