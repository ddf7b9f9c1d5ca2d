//! 可观测性：tracing 日志输出到 stderr，stdout 只留给回复信封

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认 info（debug 为 true 时 debug），RUST_LOG 优先
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
