//! 通知模块
//!
//! 提供 Teams 卡片格式化和投递功能

pub mod card;
pub mod sender;
pub mod teams;

// 重新导出主要类型
pub use card::{create_notification, NotificationCard};
pub use sender::{DeliveryOutcome, DryRunSender, NotificationSender};
pub use teams::TeamsSender;
