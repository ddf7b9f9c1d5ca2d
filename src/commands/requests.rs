//! 已校验的命令参数（强类型）
//!
//! 由 CommandSpec 校验并补全默认值后，经 serde 反序列化得到；同一结构体通过 schemars 生成参数 Schema。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::commands::CommandKind;

pub const DEFAULT_SCRAPE_LANG: &str = "en";
pub const DEFAULT_CRAWL_LIMIT: i64 = 100;
pub const MIN_CRAWL_LIMIT: i64 = 1;
pub const MAX_CRAWL_LIMIT: i64 = 5000;

fn default_scrape_lang() -> String {
    DEFAULT_SCRAPE_LANG.to_string()
}

fn default_crawl_limit() -> u32 {
    DEFAULT_CRAWL_LIMIT as u32
}

/// scrape 参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// Web page URL to scrape
    pub url: String,
    /// When true, removes markdown links from the content
    #[serde(default)]
    pub no_links: bool,
    /// Preferred language for the scraped content (ISO 639-1 code)
    #[serde(default = "default_scrape_lang")]
    pub lang: String,
}

/// map 参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MapRequest {
    /// URL of the website to map
    pub url: String,
}

/// crawl 参数；limit 在校验阶段已被夹到 [1, 5000]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CrawlRequest {
    /// URL of the webpage to crawl
    pub url: String,
    /// Maximum number of pages to crawl (1-5000, default: 100)
    #[serde(default = "default_crawl_limit")]
    #[schemars(range(min = 1, max = 5000))]
    pub limit: u32,
}

/// 转写模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    Native,
    Auto,
    Generate,
}

impl TranscriptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptMode::Native => "native",
            TranscriptMode::Auto => "auto",
            TranscriptMode::Generate => "generate",
        }
    }
}

/// transcript 参数；未提供的可选项不会发往远端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    /// Video or file URL to get transcript from (YouTube, TikTok, Instagram, Twitter, file)
    pub url: String,
    /// Preferred language code (ISO 639-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Return plain text instead of formatted output
    #[serde(default)]
    pub text: bool,
    /// Maximum characters per transcript chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<f64>,
    /// Transcript generation mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TranscriptMode>,
}

/// check_crawl_status / check_transcript_status 参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobStatusRequest {
    /// Job ID returned when the job was started
    pub id: String,
}

/// 通过校验的命令，每个变体对应一个远端操作
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedCommand {
    Scrape(ScrapeRequest),
    Map(MapRequest),
    Crawl(CrawlRequest),
    CheckCrawlStatus(JobStatusRequest),
    Transcript(TranscriptRequest),
    CheckTranscriptStatus(JobStatusRequest),
}

impl ValidatedCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            ValidatedCommand::Scrape(_) => CommandKind::Scrape,
            ValidatedCommand::Map(_) => CommandKind::Map,
            ValidatedCommand::Crawl(_) => CommandKind::Crawl,
            ValidatedCommand::CheckCrawlStatus(_) => CommandKind::CheckCrawlStatus,
            ValidatedCommand::Transcript(_) => CommandKind::Transcript,
            ValidatedCommand::CheckTranscriptStatus(_) => CommandKind::CheckTranscriptStatus,
        }
    }

    /// 命令作用对象：URL 或任务 ID，用于回复文案与日志
    pub fn subject(&self) -> &str {
        match self {
            ValidatedCommand::Scrape(r) => &r.url,
            ValidatedCommand::Map(r) => &r.url,
            ValidatedCommand::Crawl(r) => &r.url,
            ValidatedCommand::Transcript(r) => &r.url,
            ValidatedCommand::CheckCrawlStatus(r) | ValidatedCommand::CheckTranscriptStatus(r) => {
                &r.id
            }
        }
    }
}
