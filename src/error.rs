//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Post Notifier 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum PostNotifierError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文章获取相关错误
    #[error("文章获取错误: {0}")]
    Fetch(#[from] FetchError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 缺少必需的环境变量
    #[error("缺少必需的环境变量: {var}")]
    MissingVar { var: String },

    /// 环境变量取值无效
    #[error("环境变量 {var} 的值无效: {value}")]
    InvalidVar { var: String, value: String },
}

/// 内容API获取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP请求错误（连接失败、超时等）
    #[error("HTTP请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 非2xx响应
    #[error("请求 {url} 返回状态码 {status}")]
    HttpStatus { url: String, status: u16 },

    /// 响应记录缺少字段或格式错误
    #[error("响应记录格式错误 ({url}): {reason}")]
    MalformedRecord { url: String, reason: String },
}

impl FetchError {
    /// 是否为传输层或HTTP状态错误（可按策略恢复）
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestError(_) | Self::HttpStatus { .. })
    }
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败
    #[error("通知发送失败: {0}")]
    SendError(String),

    /// webhook 返回非成功状态
    #[error("webhook 返回状态码 {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 卡片序列化失败
    #[error("卡片序列化失败: {0}")]
    SerializeError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PostNotifierError>;
