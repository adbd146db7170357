//! Post Notifier - WordPress 新文章 Teams 通知工具
//!
//! 每次运行执行一条线性流水线：
//! - 通过 REST API 获取最近 24 小时内创建或修改的文章
//! - 查询作者显示名
//! - 将每篇文章格式化为 Teams 连接器卡片
//! - 逐条发送到 webhook，两次发送之间固定暂停

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod pipeline;
pub mod wordpress;

// 重新导出主要类型
pub use config::Config;
pub use error::PostNotifierError;
pub use notification::{create_notification, NotificationCard};
pub use pipeline::{Pipeline, RunSummary};
pub use wordpress::{Author, Post, WordPressClient};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
