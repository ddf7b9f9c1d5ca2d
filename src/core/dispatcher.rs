//! 命令分发器
//!
//! dispatch(name, args)：查表 -> 校验并补全默认值 -> 调用绑定的远端操作（可重试的命令经 RetryPolicy）
//! -> ResponseNormalizer 归一化。任何失败都转为 isError 信封，从不向调用方抛错；
//! 每次调用输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::client::{RemoteError, RemoteResult, SupadataClient};
use crate::commands::{self, find_spec, CommandSpec, ValidatedCommand};
use crate::core::{
    DispatchError, NormalizeContext, ResponseNormalizer, ResultEnvelope, RetryPolicy,
};

/// 分发器：持有远端客户端、重试策略与归一化器；无可变状态，可用 Arc 在并发调用间共享
pub struct CommandDispatcher {
    client: Arc<dyn SupadataClient>,
    retry: RetryPolicy,
    normalizer: ResponseNormalizer,
}

impl CommandDispatcher {
    pub fn new(client: Arc<dyn SupadataClient>, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            normalizer: ResponseNormalizer::new(),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        commands::COMMAND_SPECS.iter().map(|s| s.name).collect()
    }

    /// 全部命令的参数 Schema（JSON 字符串）
    pub fn command_schemas_json(&self) -> String {
        commands::command_schemas_json()
    }

    /// 分发一条命令；总是返回信封
    pub async fn dispatch(&self, name: &str, args: Option<Value>) -> ResultEnvelope {
        let start = Instant::now();
        let args_preview = args.as_ref().map(args_preview).unwrap_or_default();
        tracing::info!(command = %name, "command received");

        let result = self.try_dispatch(name, args.as_ref()).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(_) => (true, "ok"),
            Err(e) => (false, e.category()),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "command_audit",
            "command": name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "command completed");

        match result {
            Ok(envelope) => envelope,
            Err(e) => {
                if let DispatchError::InvalidArguments { command, reason } = &e {
                    tracing::warn!(command = %command, reason = %reason, "invalid arguments");
                }
                ResultEnvelope::error(e.to_string())
            }
        }
    }

    async fn try_dispatch(
        &self,
        name: &str,
        args: Option<&Value>,
    ) -> Result<ResultEnvelope, DispatchError> {
        let spec =
            find_spec(name).ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
        let command = spec.validate(args)?;
        let result = self.invoke(spec, &command).await?;
        let ctx = NormalizeContext {
            kind: command.kind(),
            subject: command.subject(),
        };
        Ok(self.normalizer.normalize(&result, &ctx))
    }

    async fn invoke(
        &self,
        spec: &CommandSpec,
        command: &ValidatedCommand,
    ) -> Result<RemoteResult, RemoteError> {
        if spec.retryable {
            let context = format!("{} operation", spec.name);
            self.retry.run(|| self.call_remote(command), &context).await
        } else {
            self.call_remote(command).await
        }
    }

    /// 命令 -> 绑定的远端操作
    async fn call_remote(&self, command: &ValidatedCommand) -> Result<RemoteResult, RemoteError> {
        let client = self.client.as_ref();
        match command {
            ValidatedCommand::Scrape(request) => client.scrape(request).await,
            ValidatedCommand::Map(request) => client.map(&request.url).await,
            ValidatedCommand::Crawl(request) => client.crawl(request).await,
            ValidatedCommand::CheckCrawlStatus(request) => client.crawl_result(&request.id).await,
            ValidatedCommand::Transcript(request) => client.transcript(request).await,
            ValidatedCommand::CheckTranscriptStatus(request) => {
                client.transcript_result(&request.id).await
            }
        }
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
