//! 命令参数 JSON Schema（schemars 由强类型请求自动生成）
//!
//! 用于向调用方列出可用命令及参数格式，与校验使用的 CommandSpec 表一一对应。

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

use crate::commands::requests::{
    CrawlRequest, JobStatusRequest, MapRequest, ScrapeRequest, TranscriptRequest,
};
use crate::commands::{CommandKind, COMMAND_SPECS};

fn to_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

/// 单个命令的参数 Schema
pub fn parameters_schema(kind: CommandKind) -> Value {
    match kind {
        CommandKind::Scrape => to_value::<ScrapeRequest>(),
        CommandKind::Map => to_value::<MapRequest>(),
        CommandKind::Crawl => to_value::<CrawlRequest>(),
        CommandKind::Transcript => to_value::<TranscriptRequest>(),
        CommandKind::CheckCrawlStatus | CommandKind::CheckTranscriptStatus => {
            to_value::<JobStatusRequest>()
        }
    }
}

/// 全部命令的 `{name, description, parameters}` 列表（按表顺序）
pub fn command_schemas_json() -> String {
    let commands: Vec<Value> = COMMAND_SPECS
        .iter()
        .map(|spec| {
            serde_json::json!({
                "name": spec.name,
                "description": spec.description,
                "parameters": parameters_schema(spec.kind),
            })
        })
        .collect();
    serde_json::to_string_pretty(&commands).unwrap_or_else(|_| "[]".to_string())
}
