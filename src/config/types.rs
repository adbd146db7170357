//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 主配置结构，在启动时构建一次并按引用传给各个阶段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// WordPress 内容API配置
    pub wordpress: WordPressConfig,
    /// Teams webhook 配置
    pub teams: TeamsConfig,
    /// 运行参数
    #[serde(default)]
    pub run: RunConfig,
}

/// WordPress 内容API配置
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct WordPressConfig {
    /// 站点基础URL
    pub base_url: String,
    /// API用户名
    pub username: String,
    /// 应用程序密码
    pub application_password: String,
}

// 日志中不输出密码
impl fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("application_password", &"***")
            .finish()
    }
}

/// Teams webhook 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamsConfig {
    /// webhook URL
    pub webhook_url: String,
}

/// 运行参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// 回溯窗口（小时）
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
    /// 两次投递之间的间隔（秒）
    #[serde(default = "default_delivery_delay")]
    pub delivery_delay_seconds: u64,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 是否查询作者显示名
    #[serde(default = "default_resolve_authors")]
    pub resolve_authors: bool,
    /// 文章获取失败时的处理策略
    #[serde(default)]
    pub fetch_failure_policy: FetchFailurePolicy,
    /// 演练模式，不发送任何消息
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            delivery_delay_seconds: default_delivery_delay(),
            request_timeout_seconds: default_timeout(),
            resolve_authors: default_resolve_authors(),
            fetch_failure_policy: FetchFailurePolicy::default(),
            dry_run: false,
        }
    }
}

/// 文章获取失败（连接错误、非2xx）时的处理策略
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// 记录错误并按"没有新文章"处理
    #[default]
    Empty,
    /// 错误向上传播，进程以非零状态退出
    Abort,
}

impl FromStr for FetchFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "abort" => Ok(Self::Abort),
            other => Err(format!("未知的获取失败策略: {other}，支持: empty, abort")),
        }
    }
}

impl fmt::Display for FetchFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

// 默认值函数
fn default_lookback_hours() -> u64 {
    24
}
fn default_delivery_delay() -> u64 {
    5
}
fn default_timeout() -> u64 {
    30
}
fn default_resolve_authors() -> bool {
    true
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    validate_url("WordPress 站点URL", &config.wordpress.base_url)?;
    validate_url("Teams webhook URL", &config.teams.webhook_url)?;

    if config.wordpress.username.trim().is_empty() {
        return Err("WordPress 用户名不能为空".to_string());
    }

    if config.wordpress.application_password.trim().is_empty() {
        return Err("WordPress 应用程序密码不能为空".to_string());
    }

    if config.run.lookback_hours == 0 {
        return Err("回溯窗口不能为0".to_string());
    }

    if config.run.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    Ok(())
}

fn validate_url(label: &str, url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err(format!("{label}不能为空"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("{label}必须以 http:// 或 https:// 开头: {url}"));
    }
    Ok(())
}
