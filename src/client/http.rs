//! Supadata REST 客户端（reqwest）
//!
//! 只负责转发请求与分类响应：所有请求带 `x-api-key`；非 2xx 转为 RemoteError::Api，
//! 消息形如 `HTTP 429: Too many requests`，因此限流错误可被 RetryPolicy 识别。
//! 创建类接口（crawl / transcript）响应中带 jobId 时返回 JobStarted。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use crate::client::{JobKind, RemoteError, RemoteResult, SupadataClient};
use crate::commands::{CrawlRequest, ScrapeRequest, TranscriptRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.supadata.ai/v1";

const USER_AGENT: &str = concat!("supadata-mcp/", env!("CARGO_PKG_VERSION"));

pub struct HttpSupadataClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpSupadataClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout_secs: u64) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::Transport(format!("Invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!("Invalid base URL {base_url}")));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// base_url 之后追加路径段（逐段编码，任务 ID 中的特殊字符不会破坏路径）
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, RemoteError> {
        let resp = request
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("Request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("Read body: {e}")))?;
        tracing::debug!(status = %status, body_len = body.len(), "supadata response");

        if !status.is_success() {
            return Err(RemoteError::api(
                status.as_u16(),
                error_message(status.as_u16(), status.canonical_reason(), &body),
            ));
        }
        parse_body(status.as_u16(), body)
    }

    async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, RemoteError> {
        let request = self.client.get(self.endpoint(segments)).query(query);
        self.send(request).await
    }
}

/// 从错误响应中提取可读消息：优先 JSON 的 message / error / details 字段
pub(crate) fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error", "details"]
            .iter()
            .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
    });
    let detail = detail
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
        })
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());
    format!("HTTP {status}: {detail}")
}

/// 成功响应：JSON 按 JSON 解析，其它当作文本；空响应视为解码错误
pub(crate) fn parse_body(status: u16, body: String) -> Result<Value, RemoteError> {
    if body.trim().is_empty() {
        return Err(RemoteError::Decode(format!("Empty response body (HTTP {status})")));
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

/// map 响应 `{"urls": [...]}` 取出 URL 列表，其它形状原样保留
pub(crate) fn site_map_urls(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.get("urls").is_some_and(Value::is_array) => {
            obj.remove("urls").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// crawl 创建响应：jobId 或 id 均视为任务句柄
pub(crate) fn crawl_job(value: Value) -> RemoteResult {
    let id = value
        .get("jobId")
        .or_else(|| value.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    match id {
        Some(id) => RemoteResult::job(JobKind::Crawl, id),
        None => RemoteResult::Immediate(value),
    }
}

fn transcript_query(request: &TranscriptRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![("url", request.url.clone()), ("text", request.text.to_string())];
    if let Some(lang) = &request.lang {
        query.push(("lang", lang.clone()));
    }
    if let Some(chunk_size) = request.chunk_size {
        query.push(("chunkSize", chunk_size.to_string()));
    }
    if let Some(mode) = request.mode {
        query.push(("mode", mode.as_str().to_string()));
    }
    query
}

#[async_trait]
impl SupadataClient for HttpSupadataClient {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<RemoteResult, RemoteError> {
        tracing::info!(url = %request.url, no_links = request.no_links, lang = %request.lang, "starting scrape");
        let query = [
            ("url", request.url.clone()),
            ("noLinks", request.no_links.to_string()),
            ("lang", request.lang.clone()),
        ];
        let value = self.get(&["web", "scrape"], &query).await?;
        Ok(RemoteResult::Immediate(value))
    }

    async fn map(&self, url: &str) -> Result<RemoteResult, RemoteError> {
        tracing::info!(url = %url, "starting map");
        let value = self.get(&["web", "map"], &[("url", url.to_string())]).await?;
        Ok(RemoteResult::Immediate(site_map_urls(value)))
    }

    async fn crawl(&self, request: &CrawlRequest) -> Result<RemoteResult, RemoteError> {
        tracing::info!(url = %request.url, limit = request.limit, "creating crawl job");
        let http = self
            .client
            .post(self.endpoint(&["web", "crawl"]))
            .json(request);
        let value = self.send(http).await?;
        Ok(crawl_job(value))
    }

    async fn crawl_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError> {
        let value = self.get(&["web", "crawl", job_id], &[]).await?;
        Ok(RemoteResult::Immediate(value))
    }

    async fn transcript(&self, request: &TranscriptRequest) -> Result<RemoteResult, RemoteError> {
        tracing::info!(url = %request.url, "starting transcript");
        let value = self
            .get(&["transcript"], &transcript_query(request))
            .await?;
        Ok(RemoteResult::classify(value, JobKind::Transcript))
    }

    async fn transcript_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError> {
        let value = self.get(&["transcript", job_id], &[]).await?;
        Ok(RemoteResult::Immediate(value))
    }
}
