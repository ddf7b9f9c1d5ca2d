//! supadata-mcp 命令行入口
//!
//! 用法：
//!   supadata-mcp [--offline] [--config <path>] list
//!   supadata-mcp [--offline] [--config <path>] <command> ['<json arguments>']
//!
//! 初始化配置与日志，分发一条命令并把回复信封以 JSON 打印到 stdout；信封为错误时退出码为 1。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::Value;
use supadata_mcp::{
    client::{HttpSupadataClient, MockSupadataClient, SupadataClient},
    commands::command_schemas_json,
    config::load_config,
    core::{CommandDispatcher, RetryPolicy},
    observability,
};

const USAGE: &str = "usage: supadata-mcp [--offline] [--config <path>] <list | command> ['<json arguments>']";

#[derive(Debug, Default)]
struct CliArgs {
    offline: bool,
    config_path: Option<PathBuf>,
    command: String,
    arguments: Option<String>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut cli = CliArgs::default();
        let mut positional = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--offline" => cli.offline = true,
                "--config" => {
                    let path = args.next().context("--config requires a path")?;
                    cli.config_path = Some(PathBuf::from(path));
                }
                "-h" | "--help" => bail!("{USAGE}"),
                _ => positional.push(arg),
            }
        }
        let mut positional = positional.into_iter();
        cli.command = positional.next().context(USAGE)?;
        cli.arguments = positional.next();
        if positional.next().is_some() {
            bail!("{USAGE}");
        }
        Ok(cli)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse(std::env::args().skip(1))?;

    let config = load_config(cli.config_path.clone()).context("Failed to load config")?;
    observability::init(config.app.debug);

    if cli.command == "list" {
        println!("{}", command_schemas_json());
        return Ok(());
    }

    let client: Arc<dyn SupadataClient> = if cli.offline {
        tracing::info!("running with mock Supadata client");
        Arc::new(MockSupadataClient::new())
    } else {
        let api_key = config
            .api_key()
            .context("SUPADATA_API_KEY environment variable is required")?;
        Arc::new(
            HttpSupadataClient::new(
                api_key,
                &config.supadata.base_url,
                config.supadata.timeout_secs,
            )
            .context("Failed to create Supadata client")?,
        )
    };
    let dispatcher = CommandDispatcher::new(client, RetryPolicy::new(config.retry));
    tracing::debug!(retry = ?dispatcher.retry_policy().config(), "dispatcher ready");

    let arguments: Option<Value> = cli
        .arguments
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Arguments must be a JSON object")?;

    let envelope = dispatcher.dispatch(&cli.command, arguments).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&envelope).context("Failed to serialize envelope")?
    );
    if envelope.is_error {
        std::process::exit(1);
    }
    Ok(())
}
