//! 命令规格表（静态、只读）
//!
//! 每个命令名对应唯一一个 CommandSpec：字段类型、必填/默认值、绑定的远端操作（CommandKind）以及是否重试。
//! 校验按表进行：补全默认值、夹取/拒绝越界整数，再反序列化为强类型请求。

use serde_json::{Map, Value};

use crate::commands::requests::{
    CrawlRequest, JobStatusRequest, MapRequest, ScrapeRequest, TranscriptRequest,
    ValidatedCommand, DEFAULT_CRAWL_LIMIT, DEFAULT_SCRAPE_LANG, MAX_CRAWL_LIMIT, MIN_CRAWL_LIMIT,
};
use crate::core::DispatchError;

/// 旧版工具名前缀（`supadata_scrape` 等同于 `scrape`）
pub const LEGACY_PREFIX: &str = "supadata_";

/// 命令种类，同时决定绑定的远端操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Scrape,
    Map,
    Crawl,
    CheckCrawlStatus,
    Transcript,
    CheckTranscriptStatus,
}

impl CommandKind {
    pub fn is_status_check(&self) -> bool {
        matches!(
            self,
            CommandKind::CheckCrawlStatus | CommandKind::CheckTranscriptStatus
        )
    }

    /// 已补全默认值的参数对象 -> 强类型命令
    fn build(&self, args: Value) -> Result<ValidatedCommand, serde_json::Error> {
        Ok(match self {
            CommandKind::Scrape => ValidatedCommand::Scrape(serde_json::from_value::<ScrapeRequest>(args)?),
            CommandKind::Map => ValidatedCommand::Map(serde_json::from_value::<MapRequest>(args)?),
            CommandKind::Crawl => ValidatedCommand::Crawl(serde_json::from_value::<CrawlRequest>(args)?),
            CommandKind::CheckCrawlStatus => {
                ValidatedCommand::CheckCrawlStatus(serde_json::from_value::<JobStatusRequest>(args)?)
            }
            CommandKind::Transcript => {
                ValidatedCommand::Transcript(serde_json::from_value::<TranscriptRequest>(args)?)
            }
            CommandKind::CheckTranscriptStatus => ValidatedCommand::CheckTranscriptStatus(
                serde_json::from_value::<JobStatusRequest>(args)?,
            ),
        })
    }
}

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Flag,
    /// 整数；clamp 为 true 时越界值被夹到边界，否则视为非法
    Integer { min: i64, max: i64, clamp: bool },
    /// 任意有限数；0 与负数视为未提供
    PositiveNumber,
    Choice(&'static [&'static str]),
}

/// 可选字段的默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Text(&'static str),
    Flag(bool),
    Integer(i64),
}

impl FieldDefault {
    fn to_value(self) -> Value {
        match self {
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Flag(b) => Value::Bool(b),
            FieldDefault::Integer(n) => Value::from(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
        }
    }

    const fn optional(name: &'static str, ty: FieldType, default: Option<FieldDefault>) -> Self {
        Self {
            name,
            ty,
            required: false,
            default,
        }
    }

    /// 校验单个字段值，返回规范化后的值（None 表示按未提供处理）；失败返回原因
    fn check(&self, value: &Value) -> Result<Option<Value>, String> {
        if self.ty == FieldType::PositiveNumber {
            let n = value
                .as_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| format!("`{}` must be a number", self.name))?;
            return Ok((n > 0.0).then(|| value.clone()));
        }
        self.check_value(value).map(Some)
    }

    fn check_value(&self, value: &Value) -> Result<Value, String> {
        match self.ty {
            FieldType::Text => value
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| format!("`{}` must be a string", self.name)),
            FieldType::Flag => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| format!("`{}` must be a boolean", self.name)),
            FieldType::Integer { min, max, clamp } => {
                let n = integer_value(value)
                    .ok_or_else(|| format!("`{}` must be an integer", self.name))?;
                if clamp {
                    Ok(Value::from(n.clamp(min, max)))
                } else if (min..=max).contains(&n) {
                    Ok(Value::from(n))
                } else {
                    Err(format!("`{}` must be within {min}..={max}", self.name))
                }
            }
            FieldType::Choice(options) => match value.as_str() {
                Some(s) if options.contains(&s) => Ok(Value::String(s.to_string())),
                _ => Err(format!("`{}` must be one of {}", self.name, options.join(", "))),
            },
            FieldType::PositiveNumber => Ok(value.clone()),
        }
    }
}

/// 接受 JSON 整数，以及小数部分为 0 的浮点数（如 10.0）
fn integer_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 单个命令的静态规格
#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub kind: CommandKind,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
    /// 是否经 RetryPolicy 执行（目前仅创建爬取任务）
    pub retryable: bool,
}

impl CommandSpec {
    fn has_required(&self) -> bool {
        self.fields.iter().any(|f| f.required)
    }

    fn invalid(&self, reason: impl Into<String>) -> DispatchError {
        DispatchError::InvalidArguments {
            command: self.name.to_string(),
            reason: reason.into(),
        }
    }

    /// 按表校验参数并补全默认值；null 的可选字段视为未提供，多余字段忽略。
    /// 空数组与 `{}` 一样按"未提供参数"处理
    pub fn validate(&self, args: Option<&Value>) -> Result<ValidatedCommand, DispatchError> {
        let empty = Map::new();
        let provided = match args {
            None | Some(Value::Null) => &empty,
            Some(Value::Array(items)) if items.is_empty() => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(self.invalid(format!("expected an object, got {}", json_type(other))))
            }
        };
        if provided.is_empty() && self.has_required() {
            return Err(DispatchError::NoArguments);
        }

        let mut normalized = Map::new();
        for field in self.fields {
            match provided.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    if let Some(value) = field.check(value).map_err(|reason| self.invalid(reason))? {
                        normalized.insert(field.name.to_string(), value);
                    }
                }
                None if field.required => {
                    return Err(self.invalid(format!("missing required field `{}`", field.name)))
                }
                None => {
                    if let Some(default) = field.default {
                        normalized.insert(field.name.to_string(), default.to_value());
                    }
                }
            }
        }

        self.kind
            .build(Value::Object(normalized))
            .map_err(|e| self.invalid(e.to_string()))
    }
}

const TRANSCRIPT_MODES: &[&str] = &["native", "auto", "generate"];

const SCRAPE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("url", FieldType::Text),
    FieldSpec::optional("noLinks", FieldType::Flag, Some(FieldDefault::Flag(false))),
    FieldSpec::optional(
        "lang",
        FieldType::Text,
        Some(FieldDefault::Text(DEFAULT_SCRAPE_LANG)),
    ),
];

const MAP_FIELDS: &[FieldSpec] = &[FieldSpec::required("url", FieldType::Text)];

const CRAWL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("url", FieldType::Text),
    FieldSpec::optional(
        "limit",
        FieldType::Integer {
            min: MIN_CRAWL_LIMIT,
            max: MAX_CRAWL_LIMIT,
            clamp: true,
        },
        Some(FieldDefault::Integer(DEFAULT_CRAWL_LIMIT)),
    ),
];

const TRANSCRIPT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("url", FieldType::Text),
    FieldSpec::optional("lang", FieldType::Text, None),
    FieldSpec::optional("text", FieldType::Flag, Some(FieldDefault::Flag(false))),
    FieldSpec::optional("chunkSize", FieldType::PositiveNumber, None),
    FieldSpec::optional("mode", FieldType::Choice(TRANSCRIPT_MODES), None),
];

const JOB_STATUS_FIELDS: &[FieldSpec] = &[FieldSpec::required("id", FieldType::Text)];

/// 全部命令规格；名称唯一
pub static COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name: "scrape",
        kind: CommandKind::Scrape,
        description: "Extract content from a web page as Markdown. Returns the page content, name, description and links found on the page.",
        fields: SCRAPE_FIELDS,
        retryable: false,
    },
    CommandSpec {
        name: "map",
        kind: CommandKind::Map,
        description: "List all URLs found on a website (sitemap discovery). Returns one URL per line.",
        fields: MAP_FIELDS,
        retryable: false,
    },
    CommandSpec {
        name: "crawl",
        kind: CommandKind::Crawl,
        description: "Create a crawl job that extracts content from all child pages of a URL. Returns a job ID; use check_crawl_status to poll.",
        fields: CRAWL_FIELDS,
        retryable: true,
    },
    CommandSpec {
        name: "check_crawl_status",
        kind: CommandKind::CheckCrawlStatus,
        description: "Check the status of a crawl job (scraping, completed, failed, cancelled) and retrieve its pages once completed.",
        fields: JOB_STATUS_FIELDS,
        retryable: false,
    },
    CommandSpec {
        name: "transcript",
        kind: CommandKind::Transcript,
        description: "Extract a transcript from a video (YouTube, TikTok, Instagram, Twitter) or file URL. Returns the transcript or a job ID for asynchronous processing.",
        fields: TRANSCRIPT_FIELDS,
        retryable: false,
    },
    CommandSpec {
        name: "check_transcript_status",
        kind: CommandKind::CheckTranscriptStatus,
        description: "Check the status of a transcript job (queued, active, completed, failed) and retrieve the transcript once completed.",
        fields: JOB_STATUS_FIELDS,
        retryable: false,
    },
];

/// 按名称查找规格，兼容 `supadata_` 前缀
pub fn find_spec(name: &str) -> Option<&'static CommandSpec> {
    let name = name.strip_prefix(LEGACY_PREFIX).unwrap_or(name);
    COMMAND_SPECS.iter().find(|spec| spec.name == name)
}
