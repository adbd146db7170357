//! Post Notifier 主程序入口
//!
//! 查询最近创建或修改的 WordPress 文章并发送 Teams 通知

use anyhow::{Context, Result};
use clap::Parser;
use post_notifier::cli::Args;
use post_notifier::logging::LoggingSystem;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let _logging_system =
        LoggingSystem::setup_logging(args.log_config()).context("初始化日志系统失败")?;

    info!("Post Notifier v{} 启动", post_notifier::VERSION);

    if let Err(e) = post_notifier::app::run(&args).await {
        error!("运行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
