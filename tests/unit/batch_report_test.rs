// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use dispatchrs::domain::models::batch::{Batch, BatchReport, BatchStatus};
    use dispatchrs::domain::models::dispatch_result::{DispatchResult, Outcome};
    use dispatchrs::domain::models::work_item::WorkItem;
    use dispatchrs::utils::errors::ItemError;
    use std::time::Duration;

    fn report() -> BatchReport<u16> {
        let items = WorkItem::from_targets(["https://a.test", "https://b.test", "https://c.test"]);
        let mut batch = Batch::start(3, 2);
        batch.complete(3);

        BatchReport {
            batch,
            results: vec![
                DispatchResult::new(
                    items[1].clone(),
                    Outcome::Success(200),
                    Duration::from_millis(5),
                ),
                DispatchResult::new(
                    items[0].clone(),
                    Outcome::Failure(ItemError::Status(404)),
                    Duration::from_millis(7),
                ),
                DispatchResult::cancelled(items[2].clone()),
            ],
            cancelled: true,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = report();

        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.cancelled_count(), 1);
    }

    #[test]
    fn test_report_find_matches_by_identity() {
        let report = report();

        assert_eq!(report.find(1).unwrap().outcome, Outcome::Success(200));
        assert_eq!(
            report.find(0).unwrap().outcome.error(),
            Some(&ItemError::Status(404))
        );
        assert!(report.find(9).is_none());
    }

    #[test]
    fn test_batch_lifecycle() {
        let mut batch = Batch::start(0, 4);
        assert_eq!(batch.status, BatchStatus::Running);
        assert!(batch.finished_at.is_none());

        batch.complete(12);
        assert_eq!(batch.status, BatchStatus::Complete);
        assert_eq!(batch.size, 12);
        assert!(batch.finished_at.unwrap() >= batch.started_at);
        assert_eq!(batch.status.to_string(), "complete");
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Outcome<u8> = Ok(1).into();
        let err: Outcome<u8> = Err(ItemError::Timeout(Duration::from_secs(1))).into();

        assert!(ok.is_success());
        assert!(err.is_failure());
        assert_eq!(err.error().map(ItemError::kind), Some("timeout"));
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        let item = WorkItem::new(0, "https://a.test");
        let normal: DispatchResult<u8> =
            DispatchResult::new(item.clone(), Outcome::Success(1), Duration::from_millis(1500));
        let huge: DispatchResult<u8> =
            DispatchResult::new(item, Outcome::Success(1), Duration::MAX);

        assert_eq!(normal.elapsed_ms(), 1500);
        assert_eq!(huge.elapsed_ms(), u64::MAX);
    }
}
