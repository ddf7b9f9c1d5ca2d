//! Mock 客户端（用于测试与离线运行，无需 API Key）
//!
//! 按顺序消费预置的响应队列；队列为空时返回每个操作的固定样例。所有调用都会被记录，便于断言参数。

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::client::{JobKind, RemoteError, RemoteResult, SupadataClient};
use crate::commands::{CrawlRequest, ScrapeRequest, TranscriptRequest};

/// 记录下来的一次远端调用
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Scrape(ScrapeRequest),
    Map(String),
    Crawl(CrawlRequest),
    CrawlResult(String),
    Transcript(TranscriptRequest),
    TranscriptResult(String),
}

#[derive(Debug, Default)]
pub struct MockSupadataClient {
    responses: Mutex<VecDeque<Result<RemoteResult, RemoteError>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockSupadataClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_ok(&self, result: RemoteResult) {
        self.responses.lock().await.push_back(Ok(result));
    }

    pub async fn push_err(&self, err: RemoteError) {
        self.responses.lock().await.push_back(Err(err));
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn respond(
        &self,
        call: MockCall,
        fallback: impl FnOnce() -> RemoteResult,
    ) -> Result<RemoteResult, RemoteError> {
        tracing::debug!(call = ?call, "mock supadata call");
        self.calls.lock().await.push(call);
        match self.responses.lock().await.pop_front() {
            Some(scripted) => scripted,
            None => Ok(fallback()),
        }
    }
}

#[async_trait]
impl SupadataClient for MockSupadataClient {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<RemoteResult, RemoteError> {
        self.respond(MockCall::Scrape(request.clone()), || {
            RemoteResult::text("# Test Content")
        })
        .await
    }

    async fn map(&self, url: &str) -> Result<RemoteResult, RemoteError> {
        let base = url.trim_end_matches('/').to_string();
        self.respond(MockCall::Map(url.to_string()), move || {
            RemoteResult::Immediate(json!([format!("{base}/page1"), format!("{base}/page2")]))
        })
        .await
    }

    async fn crawl(&self, request: &CrawlRequest) -> Result<RemoteResult, RemoteError> {
        self.respond(MockCall::Crawl(request.clone()), || {
            RemoteResult::job(JobKind::Crawl, "test-crawl-id")
        })
        .await
    }

    async fn crawl_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError> {
        self.respond(MockCall::CrawlResult(job_id.to_string()), || {
            RemoteResult::Immediate(json!({
                "status": "completed",
                "data": ["# Page 1 Content", "# Page 2 Content"]
            }))
        })
        .await
    }

    async fn transcript(&self, request: &TranscriptRequest) -> Result<RemoteResult, RemoteError> {
        self.respond(MockCall::Transcript(request.clone()), || {
            RemoteResult::text("Transcript content here")
        })
        .await
    }

    async fn transcript_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError> {
        self.respond(MockCall::TranscriptResult(job_id.to_string()), || {
            RemoteResult::Immediate(json!({
                "status": "completed",
                "result": "Full transcript content here"
            }))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_then_fallback() {
        let mock = MockSupadataClient::new();
        mock.push_err(RemoteError::api(500, "API Error")).await;

        let request = ScrapeRequest {
            url: "https://example.com".into(),
            no_links: false,
            lang: "en".into(),
        };
        assert_eq!(
            mock.scrape(&request).await,
            Err(RemoteError::api(500, "API Error"))
        );
        assert_eq!(
            mock.scrape(&request).await,
            Ok(RemoteResult::text("# Test Content"))
        );
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_map_fallback_uses_url() {
        let mock = MockSupadataClient::new();
        let result = mock.map("https://example.com/").await.unwrap();
        assert_eq!(
            result,
            RemoteResult::Immediate(json!([
                "https://example.com/page1",
                "https://example.com/page2"
            ]))
        );
        assert_eq!(mock.calls().await, vec![MockCall::Map("https://example.com/".into())]);
    }
}
