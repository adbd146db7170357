//! WordPress REST API 数据结构

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 文章发布状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    /// 已发布
    Publish,
    /// 定时发布
    Future,
    /// 草稿
    Draft,
    /// 待审核
    Pending,
    /// 私密
    Private,
}

impl PostStatus {
    /// 查询时请求的全部状态
    pub const ALL: [PostStatus; 5] = [
        PostStatus::Publish,
        PostStatus::Future,
        PostStatus::Draft,
        PostStatus::Pending,
        PostStatus::Private,
    ];

    /// API中使用的状态字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Future => "future",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
        }
    }
}

/// 已渲染的文本字段（如 `title.rendered`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedText {
    pub rendered: String,
}

/// 文章记录
///
/// `date` 和 `modified` 是站点本地时间，不带时区。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: RenderedText,
    /// 作者ID
    pub author: u64,
    /// 创建时间
    pub date: NaiveDateTime,
    /// 最后修改时间
    pub modified: NaiveDateTime,
    /// 文章链接
    pub link: String,
    /// 发布状态原始字符串
    pub status: String,
    /// 查询得到的作者显示名
    #[serde(skip)]
    pub author_name: Option<String>,
}

impl Post {
    /// 已渲染的标题
    pub fn title(&self) -> &str {
        &self.title.rendered
    }

    /// 附加作者显示名
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    /// 修改时间是否不早于截止时间
    pub fn modified_since(&self, cutoff: NaiveDateTime) -> bool {
        self.modified >= cutoff
    }
}

/// 作者记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    /// 显示名
    pub name: String,
}

/// 计算截止时间
pub fn cutoff_from(now: NaiveDateTime, lookback_hours: u64) -> NaiveDateTime {
    let hours = i64::try_from(lookback_hours).unwrap_or(i64::MAX);
    Duration::try_hours(hours)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(NaiveDateTime::MIN)
}

/// 将截止时间格式化为 `modified_after` 查询参数
pub fn format_cutoff(cutoff: NaiveDateTime) -> String {
    cutoff.format("%Y-%m-%dT%H:%M:%S").to_string()
}
