//! supadata-mcp - Supadata 内容提取命令分发器
//!
//! 模块划分：
//! - **client**: 远端能力接口 SupadataClient 及实现（reqwest HTTP / Mock）
//! - **commands**: 静态命令规格表、参数校验、强类型请求、参数 Schema
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 命令分发器、限流重试策略、结果归一化、回复信封与错误类型
//! - **observability**: tracing 日志初始化

pub mod client;
pub mod commands;
pub mod config;
pub mod core;
pub mod observability;

pub use crate::client::{HttpSupadataClient, MockSupadataClient, SupadataClient};
pub use crate::core::{CommandDispatcher, ResultEnvelope, RetryConfig, RetryPolicy};
