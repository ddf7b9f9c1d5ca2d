//! 核心分发层：错误类型、回复信封、重试策略、结果归一化、命令分发器

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod normalizer;
pub mod retry;

pub use dispatcher::CommandDispatcher;
pub use envelope::{ResultEnvelope, TextContent};
pub use error::DispatchError;
pub use normalizer::{NormalizeContext, ResponseNormalizer};
pub use retry::{RetryConfig, RetryPolicy};
