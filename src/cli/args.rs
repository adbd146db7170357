//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::{FetchFailurePolicy, RunConfig};
use crate::logging::LogConfig;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// 将最近创建或修改的 WordPress 文章发送到 Microsoft Teams
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "post-notifier",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 只做演练，不发送 Teams 通知
    #[arg(short, long, help = "只做演练，不发送 Teams 通知")]
    pub dry_run: bool,

    /// 输出更详细的日志
    #[arg(long, help = "输出更详细的日志")]
    pub verbose: bool,

    /// TOML配置文件路径（不指定则从环境变量读取）
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "TOML配置文件路径（不指定则从环境变量读取）",
        env = "POST_NOTIFIER_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志输出格式
    #[arg(long, value_enum, default_value = "text", help = "日志输出格式")]
    pub log_format: LogFormat,

    /// 日志文件路径（指定后日志写入文件而不是控制台）
    #[arg(
        long,
        value_name = "FILE",
        help = "日志文件路径（指定后日志写入文件而不是控制台）"
    )]
    pub log_file: Option<PathBuf>,

    /// 不查询作者显示名
    #[arg(long, help = "不查询作者显示名")]
    pub no_author_lookup: bool,

    /// 获取文章失败时以非零状态退出
    #[arg(long, help = "获取文章失败时以非零状态退出")]
    pub fail_on_fetch_error: bool,
}

/// 日志输出格式
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 文本格式
    #[default]
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 日志级别：`--verbose` 时为 debug，否则为 info
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// 根据命令行参数构建日志配置
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level(),
            file_path: self.log_file.clone(),
            console: self.log_file.is_none(),
            json_format: self.log_format == LogFormat::Json,
            ..LogConfig::default()
        }
    }

    /// 用命令行参数覆盖运行配置
    pub fn apply_overrides(&self, run: &mut RunConfig) {
        if self.dry_run {
            run.dry_run = true;
        }
        if self.no_author_lookup {
            run.resolve_authors = false;
        }
        if self.fail_on_fetch_error {
            run.fetch_failure_policy = FetchFailurePolicy::Abort;
        }
    }
}
