// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 闭包操作测试
///
/// 验证任意异步闭包都可以作为调度器的操作使用
#[cfg(test)]
mod tests {
    use dispatchrs::config::dispatch::DispatchConfig;
    use dispatchrs::domain::models::dispatch_result::Outcome;
    use dispatchrs::domain::models::work_item::WorkItem;
    use dispatchrs::engines::traits::{from_fn, Operation};
    use dispatchrs::utils::errors::ItemError;
    use dispatchrs::workers::Dispatcher;

    #[tokio::test]
    async fn test_fn_operation_executes_closure() {
        let op = from_fn(|item: WorkItem| async move {
            Ok::<_, ItemError>(item.target.to_uppercase())
        });

        let output = op.execute(&WorkItem::new(0, "abc")).await.unwrap();

        assert_eq!(output, "ABC");
        assert_eq!(op.name(), "fn");
    }

    #[tokio::test]
    async fn test_dispatcher_with_closure_operation() {
        let op = from_fn(|item: WorkItem| async move {
            if item.target.ends_with("bad") {
                Err(ItemError::Other("rejected".to_string()))
            } else {
                Ok(item.target.len())
            }
        });
        let dispatcher = Dispatcher::new(op, DispatchConfig::new(2)).unwrap();

        let report = dispatcher
            .run(WorkItem::from_targets(["one", "two-bad", "three"]))
            .await;

        assert_eq!(report.len(), 3);
        assert_eq!(report.find(0).unwrap().outcome, Outcome::Success(3));
        assert_eq!(
            report.find(1).unwrap().outcome,
            Outcome::Failure(ItemError::Other("rejected".to_string()))
        );
        assert_eq!(report.find(2).unwrap().outcome, Outcome::Success(5));
    }
}
