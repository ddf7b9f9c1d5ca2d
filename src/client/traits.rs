//! 远端能力接口
//!
//! 所有后端（HTTP / Mock）实现 SupadataClient：六个远端操作，返回 RemoteResult（立即结果或任务句柄）。
//! 失败统一为 RemoteError，其 Display 即远端给出的可读消息，分发器原样透传。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::commands::{CrawlRequest, ScrapeRequest, TranscriptRequest};

/// 异步任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Crawl,
    Transcript,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Crawl => "crawl",
            JobKind::Transcript => "transcript",
        }
    }

    /// 查询该任务进度所用的命令名
    pub fn status_command(&self) -> &'static str {
        match self {
            JobKind::Crawl => "check_crawl_status",
            JobKind::Transcript => "check_transcript_status",
        }
    }
}

/// 任务句柄：仅作为值返回给调用方，本地不保存任何任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    pub kind: JobKind,
}

/// 远端结果：立即内容（文本或结构化 JSON）或已启动的异步任务
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResult {
    Immediate(Value),
    JobStarted(JobHandle),
}

impl RemoteResult {
    pub fn text(s: impl Into<String>) -> Self {
        RemoteResult::Immediate(Value::String(s.into()))
    }

    pub fn job(kind: JobKind, job_id: impl Into<String>) -> Self {
        RemoteResult::JobStarted(JobHandle {
            job_id: job_id.into(),
            kind,
        })
    }

    /// 按响应形状分类：对象中带字符串 `jobId` 视为任务句柄，其余为立即结果
    pub fn classify(value: Value, kind: JobKind) -> Self {
        match value.get("jobId").and_then(|v| v.as_str()) {
            Some(id) => RemoteResult::job(kind, id),
            None => RemoteResult::Immediate(value),
        }
    }
}

/// 远端失败；Display 只输出人类可读消息
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// 远端返回非 2xx；message 已包含状态码
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),

    /// 无法识别形状的失败（没有可分类的错误消息），永远不视为瞬时错误
    #[error("{0}")]
    Opaque(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Api {
            status,
            message: message.into(),
        }
    }

    /// 可用于分类的错误消息；Opaque 没有
    pub fn message(&self) -> Option<&str> {
        match self {
            RemoteError::Api { message, .. } => Some(message),
            RemoteError::Transport(m) | RemoteError::Decode(m) => Some(m),
            RemoteError::Opaque(_) => None,
        }
    }

    /// 是否为限流类瞬时错误：消息（忽略大小写）包含 "rate limit" 或 "429"
    ///
    /// 仅靠字符串匹配，远端措辞变化会导致分类失效。
    pub fn is_transient(&self) -> bool {
        match self.message() {
            Some(m) => {
                let lower = m.to_lowercase();
                lower.contains("rate limit") || lower.contains("429")
            }
            None => false,
        }
    }
}

/// Supadata 能力接口：抓取、站点地图、爬取、转写及两类任务状态查询
#[async_trait]
pub trait SupadataClient: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<RemoteResult, RemoteError>;

    async fn map(&self, url: &str) -> Result<RemoteResult, RemoteError>;

    /// 创建爬取任务，正常返回 JobStarted
    async fn crawl(&self, request: &CrawlRequest) -> Result<RemoteResult, RemoteError>;

    async fn crawl_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError>;

    /// 转写：短视频可能直接返回内容，长视频返回任务句柄
    async fn transcript(&self, request: &TranscriptRequest) -> Result<RemoteResult, RemoteError>;

    async fn transcript_result(&self, job_id: &str) -> Result<RemoteResult, RemoteError>;
}
