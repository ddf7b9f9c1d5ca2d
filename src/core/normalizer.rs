//! 远端结果归一化：RemoteResult -> ResultEnvelope
//!
//! 纯函数，无副作用、无失败路径。规则按优先级：
//! 状态查询一律缩进序列化；map 把 URL 列表按行拼接；任务句柄生成「已启动」提示；
//! 文本原样输出；其它结构化值缩进序列化。所有文本去除首尾空白。

use serde_json::Value;

use crate::client::{JobHandle, RemoteResult};
use crate::commands::CommandKind;
use crate::core::ResultEnvelope;

/// 归一化上下文：命令种类与作用对象（URL 或任务 ID）
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub kind: CommandKind,
    pub subject: &'a str,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, result: &RemoteResult, ctx: &NormalizeContext<'_>) -> ResultEnvelope {
        let text = if ctx.kind.is_status_check() {
            match result {
                RemoteResult::Immediate(value) => pretty(value),
                RemoteResult::JobStarted(handle) => {
                    pretty(&serde_json::json!({ "jobId": handle.job_id }))
                }
            }
        } else {
            match result {
                RemoteResult::JobStarted(handle) => job_started_message(handle, ctx.subject),
                RemoteResult::Immediate(value) if ctx.kind == CommandKind::Map => join_urls(value),
                RemoteResult::Immediate(Value::String(s)) => s.clone(),
                RemoteResult::Immediate(value) => pretty(value),
            }
        };
        ResultEnvelope::text(text.trim())
    }
}

fn job_started_message(handle: &JobHandle, subject: &str) -> String {
    format!(
        "Started {} job for {} with job ID: {}. Use {} to check progress.",
        handle.kind.as_str(),
        subject,
        handle.job_id,
        handle.kind.status_command()
    )
}

/// 2 空格缩进的 JSON
fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// URL 列表按行拼接；远端若返回单个标量则当作单元素列表，null 记为空行
fn join_urls(value: &Value) -> String {
    let items = match value {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
