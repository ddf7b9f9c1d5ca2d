//! 分发错误类型
//!
//! 校验错误在本地产生、从不重试；远端错误原样包裹，Display 即远端消息。
//! 所有 DispatchError 最终都由 CommandDispatcher 转成 isError 信封，不会越过分发边界。

use thiserror::Error;

use crate::client::RemoteError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownCommand(String),

    #[error("No arguments provided")]
    NoArguments,

    /// reason 只进日志，不出现在回复文本中
    #[error("Invalid arguments for {command}")]
    InvalidArguments { command: String, reason: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl DispatchError {
    /// 审计日志中的错误类别
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::UnknownCommand(_) => "unknown_command",
            DispatchError::NoArguments | DispatchError::InvalidArguments { .. } => "validation",
            DispatchError::Remote(e) if e.is_transient() => "rate_limited",
            DispatchError::Remote(_) => "remote",
        }
    }
}
