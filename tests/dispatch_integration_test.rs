//! 分发器集成测试：通过公开 API + MockSupadataClient 驱动完整的校验 / 重试 / 归一化流程

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use supadata_mcp::client::{
    HttpSupadataClient, MockCall, MockSupadataClient, RemoteError, RemoteResult,
};
use supadata_mcp::commands::{CrawlRequest, ScrapeRequest, TranscriptMode, TranscriptRequest};
use supadata_mcp::core::{CommandDispatcher, ResultEnvelope, RetryConfig, RetryPolicy};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup() -> (Arc<MockSupadataClient>, CommandDispatcher) {
    setup_with(RetryConfig::default())
}

fn setup_with(config: RetryConfig) -> (Arc<MockSupadataClient>, CommandDispatcher) {
    let mock = Arc::new(MockSupadataClient::new());
    let dispatcher = CommandDispatcher::new(mock.clone(), RetryPolicy::new(config));
    (mock, dispatcher)
}

#[tokio::test]
async fn test_unknown_commands() {
    let (_, dispatcher) = setup();
    for name in ["search", "supadata_search", "SCRAPE", ""] {
        let env = dispatcher.dispatch(name, Some(json!({"url": "https://example.com"}))).await;
        assert_eq!(env, ResultEnvelope::error(format!("Unknown tool: {name}")));
    }
}

#[tokio::test]
async fn test_no_arguments_for_every_command() {
    let (mock, dispatcher) = setup();
    for name in dispatcher.command_names() {
        let env = dispatcher.dispatch(name, None).await;
        assert_eq!(env, ResultEnvelope::error("No arguments provided"));
        let env = dispatcher.dispatch(name, Some(json!({}))).await;
        assert_eq!(env, ResultEnvelope::error("No arguments provided"));
    }
    assert_eq!(mock.call_count().await, 0);
}

#[tokio::test]
async fn test_scrape_returns_text() {
    let (mock, dispatcher) = setup();
    mock.push_ok(RemoteResult::text("# Test Content")).await;

    let env = dispatcher
        .dispatch(
            "scrape",
            Some(json!({"url": "https://example.com", "formats": ["markdown"]})),
        )
        .await;

    assert_eq!(
        serde_json::to_value(&env).unwrap(),
        json!({"content": [{"type": "text", "text": "# Test Content"}], "isError": false})
    );
    assert_eq!(
        mock.calls().await,
        vec![MockCall::Scrape(ScrapeRequest {
            url: "https://example.com".into(),
            no_links: false,
            lang: "en".into(),
        })]
    );
}

#[tokio::test]
async fn test_map_joins_lines() {
    let (mock, dispatcher) = setup();
    mock.push_ok(RemoteResult::Immediate(json!([
        "https://example.com/page1",
        "https://example.com/page2"
    ])))
    .await;

    let env = dispatcher
        .dispatch("supadata_map", Some(json!({"url": "https://example.com"})))
        .await;

    assert!(!env.is_error);
    assert_eq!(
        env.first_text(),
        "https://example.com/page1\nhttps://example.com/page2"
    );
}

#[tokio::test]
async fn test_crawl_uses_default_limit() {
    let (mock, dispatcher) = setup();
    mock.push_ok(RemoteResult::job(
        supadata_mcp::client::JobKind::Crawl,
        "test-crawl-id",
    ))
    .await;

    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "https://example.com", "maxDepth": 2})))
        .await;

    assert!(!env.is_error);
    assert!(env.first_text().contains("test-crawl-id"));
    assert!(env.first_text().contains("check_crawl_status"));
    assert_eq!(
        mock.calls().await,
        vec![MockCall::Crawl(CrawlRequest {
            url: "https://example.com".into(),
            limit: 100,
        })]
    );
}

#[tokio::test]
async fn test_transcript_job_and_status_poll() {
    let (mock, dispatcher) = setup();
    mock.push_ok(RemoteResult::job(
        supadata_mcp::client::JobKind::Transcript,
        "test-transcript-job-id",
    ))
    .await;
    mock.push_ok(RemoteResult::Immediate(json!({
        "status": "completed",
        "result": "Full transcript content here"
    })))
    .await;

    let started = dispatcher
        .dispatch(
            "transcript",
            Some(json!({"url": "https://youtube.com/watch?v=example", "mode": "native", "lang": null})),
        )
        .await;
    assert_eq!(
        started.first_text(),
        "Started transcript job for https://youtube.com/watch?v=example with job ID: test-transcript-job-id. Use check_transcript_status to check progress."
    );

    let status = dispatcher
        .dispatch("check_transcript_status", Some(json!({"id": "test-transcript-job-id"})))
        .await;
    assert!(!status.is_error);
    assert!(status.first_text().contains("\"status\": \"completed\""));

    assert_eq!(
        mock.calls().await,
        vec![
            MockCall::Transcript(TranscriptRequest {
                url: "https://youtube.com/watch?v=example".into(),
                lang: None,
                text: false,
                chunk_size: None,
                mode: Some(TranscriptMode::Native),
            }),
            MockCall::TranscriptResult("test-transcript-job-id".into()),
        ]
    );
}

#[tokio::test]
async fn test_transcript_non_positive_chunk_size_is_dropped() {
    let (mock, dispatcher) = setup();
    for chunk_size in [json!(0), json!(-5)] {
        let env = dispatcher
            .dispatch(
                "transcript",
                Some(json!({"url": "https://youtube.com/watch?v=example", "chunkSize": chunk_size})),
            )
            .await;
        assert!(!env.is_error);
    }
    let env = dispatcher
        .dispatch(
            "transcript",
            Some(json!({"url": "https://youtube.com/watch?v=example", "chunkSize": 2.5})),
        )
        .await;
    assert!(!env.is_error);

    let chunk_sizes: Vec<Option<f64>> = mock
        .calls()
        .await
        .into_iter()
        .map(|call| match call {
            MockCall::Transcript(request) => request.chunk_size,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(chunk_sizes, vec![None, None, Some(2.5)]);
}

#[tokio::test]
async fn test_http_crawl_retries_rate_limit_through_dispatcher() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/web/crawl"))
        .and(header("x-api-key", "test-key"))
        .and(body_json(json!({"url": "https://example.com", "limit": 100})))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": "limit-exceeded",
            "message": "Rate limit exceeded"
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/web/crawl"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"jobId": "crawl-live-1"})))
        .mount(&server)
        .await;

    let client =
        HttpSupadataClient::new("test-key", &format!("{}/v1", server.uri()), 5).unwrap();
    let retry = RetryConfig::default()
        .with_initial_delay_ms(10)
        .with_max_delay_ms(50);
    let dispatcher = CommandDispatcher::new(Arc::new(client), RetryPolicy::new(retry));

    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "https://example.com"})))
        .await;

    assert_eq!(
        env.first_text(),
        "Started crawl job for https://example.com with job ID: crawl-live-1. Use check_crawl_status to check progress."
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_http_crawl_exhaustion_surfaces_status_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/web/crawl"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "Rate limit exceeded"})))
        .mount(&server)
        .await;

    let client =
        HttpSupadataClient::new("test-key", &format!("{}/v1", server.uri()), 5).unwrap();
    let retry = RetryConfig::default()
        .with_max_attempts(2)
        .with_initial_delay_ms(10);
    let dispatcher = CommandDispatcher::new(Arc::new(client), RetryPolicy::new(retry));

    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "https://example.com", "limit": 3})))
        .await;

    assert_eq!(env, ResultEnvelope::error("HTTP 429: Rate limit exceeded"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_crawl_retries_rate_limit_then_succeeds() {
    let (mock, dispatcher) = setup();
    mock.push_err(RemoteError::api(429, "HTTP 429: Rate limit exceeded")).await;
    mock.push_err(RemoteError::api(429, "HTTP 429: Rate limit exceeded")).await;
    mock.push_ok(RemoteResult::job(supadata_mcp::client::JobKind::Crawl, "crawl-3"))
        .await;

    let start = tokio::time::Instant::now();
    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "https://example.com", "limit": 10})))
        .await;
    let elapsed = start.elapsed();

    assert!(!env.is_error);
    assert!(env.first_text().contains("crawl-3"));
    assert_eq!(mock.call_count().await, 3);
    // 1000ms + 2000ms
    assert!(elapsed >= Duration::from_millis(3000) && elapsed < Duration::from_millis(3200));
}

#[tokio::test(start_paused = true)]
async fn test_crawl_retry_exhaustion_surfaces_last_message() {
    let (mock, dispatcher) = setup_with(RetryConfig::default().with_max_attempts(3));
    for n in 1..=5 {
        mock.push_err(RemoteError::api(429, format!("rate limit exceeded ({n})")))
            .await;
    }

    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "https://example.com"})))
        .await;

    assert_eq!(env, ResultEnvelope::error("rate limit exceeded (3)"));
    assert_eq!(mock.call_count().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_permanent_failure_invoked_once() {
    let (mock, dispatcher) = setup_with(RetryConfig::default().with_max_attempts(10));
    mock.push_err(RemoteError::api(400, "HTTP 400: Invalid URL")).await;

    let env = dispatcher
        .dispatch("crawl", Some(json!({"url": "not-a-url"})))
        .await;

    assert_eq!(env, ResultEnvelope::error("HTTP 400: Invalid URL"));
    assert_eq!(mock.call_count().await, 1);
}

#[tokio::test]
async fn test_scrape_errors_pass_through_unretried() {
    let (mock, dispatcher) = setup();
    mock.push_err(RemoteError::Transport("API Error".into())).await;
    mock.push_err(RemoteError::api(429, "rate limit exceeded")).await;

    let env = dispatcher
        .dispatch("scrape", Some(json!({"url": "https://example.com"})))
        .await;
    assert_eq!(env, ResultEnvelope::error("API Error"));

    let env = dispatcher
        .dispatch("scrape", Some(json!({"url": "https://example.com"})))
        .await;
    assert_eq!(env, ResultEnvelope::error("rate limit exceeded"));
    assert_eq!(mock.call_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let (mock, dispatcher) = setup();
    let dispatcher = Arc::new(dispatcher);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .dispatch("check_crawl_status", Some(json!({"id": format!("job-{i}")})))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let env = handle.await.unwrap();
        assert!(!env.is_error);
        assert!(env.first_text().contains("completed"));
    }
    assert_eq!(mock.call_count().await, 8);
}

#[test]
fn test_command_schemas_cover_all_commands() {
    let (_, dispatcher) = setup();
    let schemas: Vec<serde_json::Value> =
        serde_json::from_str(&dispatcher.command_schemas_json()).unwrap();
    let names: Vec<&str> = schemas.iter().filter_map(|s| s["name"].as_str()).collect();
    assert_eq!(names, dispatcher.command_names());
}
