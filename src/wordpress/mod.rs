//! WordPress 内容API模块
//!
//! 提供文章与作者数据结构以及带认证的查询客户端

pub mod client;
pub mod types;

// 重新导出主要类型
pub use client::WordPressClient;
pub use types::{Author, Post, PostStatus};
