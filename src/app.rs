//! 应用程序核心逻辑
//!
//! 加载配置、应用命令行覆盖并执行一次通知流水线

use crate::cli::Args;
use crate::config::{self, ConfigLoader, EnvConfigLoader, TomlConfigLoader};
use crate::pipeline::{Pipeline, RunSummary};
use anyhow::{Context, Result};
use tracing::info;

/// 执行一次完整运行
///
/// 返回 `Err` 时调用方应以状态码 1 退出。
pub async fn run(args: &Args) -> Result<RunSummary> {
    let config = load_config(args).await?;
    info!(
        "站点: {}，回溯 {} 小时，演练模式: {}",
        config.wordpress.base_url, config.run.lookback_hours, config.run.dry_run
    );

    let pipeline = Pipeline::new(&config).context("初始化通知流水线失败")?;
    pipeline.run().await.context("处理新文章失败")
}

/// 加载配置
///
/// 先加载 `.env` 文件；指定了 `--config` 时读取TOML文件，否则读取环境变量。
/// 最后应用命令行参数覆盖。
async fn load_config(args: &Args) -> Result<config::Config> {
    config::load_dotenv().context("加载 .env 文件失败")?;

    let mut config = match args.config {
        Some(ref path) => TomlConfigLoader::new(path, true)
            .load()
            .await
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
        None => EnvConfigLoader::new()
            .load()
            .await
            .context("从环境变量加载配置失败")?,
    };

    args.apply_overrides(&mut config.run);
    Ok(config)
}
