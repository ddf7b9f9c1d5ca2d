//! 限流重试策略
//!
//! 对单个远端调用做有界指数退避：仅对限流类瞬时错误（RemoteError::is_transient）重试，
//! 其它错误首次失败即返回。最多调用 max_attempts 次，第 n 次失败后等待
//! `min(initial_delay_ms * backoff_factor^(n-1), max_delay_ms)` 毫秒。

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::client::RemoteError;

/// 重试参数；由配置显式传入 RetryPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// 总调用次数上限（含首次）；1 表示不重试
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_factor() -> u64 {
    2
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay_ms(mut self, ms: u64) -> Self {
        self.initial_delay_ms = ms;
        self
    }

    pub fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    pub fn with_backoff_factor(mut self, factor: u64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// 第 attempt 次（从 1 开始）失败后的等待时长；溢出时饱和到 max_delay_ms
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let ms = self
            .backoff_factor
            .checked_pow(exponent)
            .map(|growth| self.initial_delay_ms.saturating_mul(growth))
            .unwrap_or(u64::MAX)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// 单次 run 内的重试状态，不跨调用共享
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryState {
    attempt: u32,
    last_delay_ms: u64,
}

/// 重试策略：无共享可变状态，可被并发分发共用
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// 执行 operation；瞬时错误在次数内退避重试，耗尽或永久错误原样返回
    pub async fn run<T, F, Fut>(&self, mut operation: F, context: &str) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = RetryState {
            attempt: 1,
            last_delay_ms: 0,
        };

        loop {
            let err = match operation().await {
                Ok(value) => {
                    if state.attempt > 1 {
                        tracing::info!(
                            context = %context,
                            attempt = state.attempt,
                            "operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }
            if state.attempt >= max_attempts {
                tracing::warn!(
                    context = %context,
                    attempts = state.attempt,
                    last_delay_ms = state.last_delay_ms,
                    error = %err,
                    "rate limit retries exhausted"
                );
                return Err(err);
            }

            let delay = self.config.delay_for(state.attempt);
            state.last_delay_ms = delay.as_millis() as u64;
            tracing::warn!(
                "Rate limit hit for {}. Attempt {}/{}. Retrying in {}ms",
                context,
                state.attempt,
                max_attempts,
                state.last_delay_ms
            );
            tokio::time::sleep(delay).await;
            state.attempt += 1;
        }
    }
}
