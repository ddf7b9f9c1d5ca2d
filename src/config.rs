//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SUPADATA__*` 覆盖（双下划线表示嵌套，如 `SUPADATA__RETRY__MAX_ATTEMPTS=5`），
//! 最后兼容旧的扁平变量 `SUPADATA_API_KEY`、`SUPADATA_RETRY_*`（非正整数的值被忽略）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;
use crate::core::RetryConfig;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub supadata: SupadataSection,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    /// 打开 debug 日志（RUST_LOG 仍可覆盖）
    #[serde(default)]
    pub debug: bool,
}

/// [supadata] 段：API Key、服务地址与请求超时
#[derive(Debug, Clone, Deserialize)]
pub struct SupadataSection {
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 单次 HTTP 请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for SupadataSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// 非空的 API Key
    pub fn api_key(&self) -> Option<&str> {
        self.supadata
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// 旧版扁平环境变量 -> 配置键
const LEGACY_RETRY_VARS: [(&str, &str); 4] = [
    ("SUPADATA_RETRY_MAX_ATTEMPTS", "retry.max_attempts"),
    ("SUPADATA_RETRY_INITIAL_DELAY", "retry.initial_delay_ms"),
    ("SUPADATA_RETRY_MAX_DELAY", "retry.max_delay_ms"),
    ("SUPADATA_RETRY_BACKOFF_FACTOR", "retry.backoff_factor"),
];

/// 解析旧版变量；lookup 通常为 `std::env::var(..).ok()`
fn legacy_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, config::Value)> {
    let mut overrides = Vec::new();
    if let Some(key) = lookup("SUPADATA_API_KEY").filter(|k| !k.trim().is_empty()) {
        overrides.push(("supadata.api_key", config::Value::from(key)));
    }
    for (var, key) in LEGACY_RETRY_VARS {
        let parsed = lookup(var)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n > 0);
        if let Some(n) = parsed {
            overrides.push((key, config::Value::from(n)));
        }
    }
    overrides
}

/// 从 config 目录加载配置，环境变量 SUPADATA__* 与旧版 SUPADATA_* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 SUPADATA__*（双下划线表示嵌套键）
/// 4. 最后应用旧版扁平变量
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SUPADATA")
            .separator("__")
            .try_parsing(true),
    );

    for (key, value) in legacy_overrides(|var| std::env::var(var).ok()) {
        builder = builder.set_override(key, value)?;
    }

    let c = builder.build()?;
    c.try_deserialize()
}
