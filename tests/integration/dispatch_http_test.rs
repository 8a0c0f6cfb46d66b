// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 调度器与 HTTP 引擎的集成测试
///
/// 使用 wiremock 启动本地服务器，验证真实请求下的部分失败隔离、
/// 单项超时和文件工作源。
#[cfg(test)]
mod tests {
    use dispatchrs::config::dispatch::{DispatchConfig, DispatchMode};
    use dispatchrs::config::settings::HttpSettings;
    use dispatchrs::domain::models::dispatch_result::Outcome;
    use dispatchrs::domain::models::work_item::WorkItem;
    use dispatchrs::engines::reqwest_engine::ReqwestEngine;
    use dispatchrs::queue::source::{LineFileSource, RepeatSource};
    use dispatchrs::utils::errors::ItemError;
    use dispatchrs::workers::Dispatcher;
    use std::io::Write;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine() -> ReqwestEngine {
        ReqwestEngine::new(&HttpSettings {
            user_agent: "dispatchrs-it".to_string(),
            timeout_ms: 10_000,
            keep_body: false,
        })
        .unwrap()
    }

    async fn start_server() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("slow")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_mixed_http_outcomes() {
        let server = start_server().await;
        let dispatcher = Dispatcher::new(engine(), DispatchConfig::new(3)).unwrap();

        let items: Vec<WorkItem> = (1..=5)
            .map(|id| {
                let route = if id == 3 { "fail" } else { "ok" };
                WorkItem::new(id, format!("{}/{}", server.uri(), route))
            })
            .collect();

        let report = dispatcher.run(items).await;

        assert_eq!(report.len(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(
            report.find(3).unwrap().outcome.error(),
            Some(&ItemError::Status(503))
        );
        for id in [1, 2, 4, 5] {
            match &report.find(id).unwrap().outcome {
                Outcome::Success(response) => {
                    assert_eq!(response.status_code, 200);
                    assert_eq!(response.content_length, 2);
                }
                Outcome::Failure(e) => panic!("item {} failed: {}", id, e),
            }
        }
    }

    #[tokio::test]
    async fn test_item_timeout_over_http() {
        let server = start_server().await;
        let config = DispatchConfig::new(2).with_item_timeout(Duration::from_millis(200));
        let dispatcher = Dispatcher::new(engine(), config).unwrap();

        let items = vec![
            WorkItem::new(0, format!("{}/ok", server.uri())),
            WorkItem::new(1, format!("{}/slow", server.uri())),
            WorkItem::new(2, format!("{}/ok", server.uri())),
        ];

        let report = dispatcher.run(items).await;

        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert!(matches!(
            report.find(1).unwrap().outcome,
            Outcome::Failure(ItemError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_repeat_source_in_paced_mode() {
        let server = start_server().await;
        let config = DispatchConfig::new(2)
            .with_mode(DispatchMode::Paced)
            .with_pacing(Duration::from_millis(20));
        let dispatcher = Dispatcher::new(engine(), config).unwrap();
        let source = RepeatSource::new(format!("{}/ok", server.uri()), 5);

        let report = dispatcher
            .run_source(&source, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.len(), 5);
        assert_eq!(report.succeeded(), 5);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 5);
    }

    #[tokio::test]
    async fn test_line_file_source_over_http() {
        let server = start_server().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# smoke targets").unwrap();
        writeln!(file, "{}/ok", server.uri()).unwrap();
        writeln!(file, "{}/fail", server.uri()).unwrap();
        writeln!(file, "{}/ok", server.uri()).unwrap();

        let dispatcher = Dispatcher::new(engine(), DispatchConfig::new(4)).unwrap();
        let report = dispatcher
            .run_source(&LineFileSource::new(file.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.find(1).unwrap().outcome.is_failure());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_http_requests() {
        let server = start_server().await;
        let dispatcher = Dispatcher::new(engine(), DispatchConfig::new(2)).unwrap();
        let items: Vec<WorkItem> = (0..4)
            .map(|id| WorkItem::new(id, format!("{}/slow", server.uri())))
            .collect();

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });

        let report = dispatcher.run_with_cancel(items, token).await;

        assert_eq!(report.len(), 4);
        assert!(report.cancelled);
        assert_eq!(report.cancelled_count(), 4);
    }
}
