//! Teams 连接器卡片（MessageCard）
//!
//! 定义卡片的线上格式，以及由文章构建卡片的格式化函数

use crate::error::{NotificationError, Result};
use crate::wordpress::Post;
use chrono::NaiveDateTime;
use serde::Serialize;

/// 卡片标题前缀
pub const TITLE_PREFIX: &str = "Blogpost erstellt/geändert";
/// 卡片主题色（不带 `#`）
pub const THEME_COLOR: &str = "3AB660";
/// 后台按钮文字
pub const ADMIN_ACTION_LABEL: &str = "Blog - Admin";
/// 后台文章列表路径
pub const ADMIN_EDIT_PATH: &str = "/wp-admin/edit.php";
/// 日期事实的格式
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// 事实（标签/值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

/// 卡片分区
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardSection {
    pub facts: Vec<Fact>,
}

impl CardSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条事实，保持追加顺序
    pub fn with_fact(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.facts.push(Fact {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// 打开链接的目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionTarget {
    pub os: String,
    pub uri: String,
}

/// "打开URL" 动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub name: String,
    pub targets: Vec<ActionTarget>,
}

impl CardAction {
    /// 创建打开链接的按钮
    pub fn open_uri(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            action_type: "OpenUri".to_string(),
            name: name.into(),
            targets: vec![ActionTarget {
                os: "default".to_string(),
                uri: uri.into(),
            }],
        }
    }
}

/// 发送到 Teams webhook 的通知卡片
///
/// 目标 webhook URL 随卡片一起保存，但不参与序列化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCard {
    #[serde(skip)]
    webhook_url: String,
    #[serde(rename = "@type")]
    card_type: String,
    #[serde(rename = "@context")]
    context: String,
    title: String,
    summary: String,
    theme_color: String,
    sections: Vec<CardSection>,
    potential_action: Vec<CardAction>,
}

impl NotificationCard {
    /// 创建发往指定 webhook 的空卡片
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            card_type: "MessageCard".to_string(),
            context: "https://schema.org/extensions".to_string(),
            title: String::new(),
            summary: String::new(),
            theme_color: String::new(),
            sections: Vec::new(),
            potential_action: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = color.into();
        self
    }

    pub fn with_section(mut self, section: CardSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_link_button(mut self, label: impl Into<String>, uri: impl Into<String>) -> Self {
        self.potential_action.push(CardAction::open_uri(label, uri));
        self
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn theme_color(&self) -> &str {
        &self.theme_color
    }

    pub fn sections(&self) -> &[CardSection] {
        &self.sections
    }

    /// 所有分区的事实，按顺序展开
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.sections.iter().flat_map(|section| section.facts.iter())
    }

    pub fn actions(&self) -> &[CardAction] {
        &self.potential_action
    }

    /// 线上格式的JSON
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| NotificationError::SerializeError(e.to_string()).into())
    }

    /// 便于调试输出的格式化JSON
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NotificationError::SerializeError(e.to_string()).into())
    }
}

/// 由文章构建通知卡片
///
/// 标题和摘要相同；事实顺序固定为 Autor（仅当已查询作者）、Datum、
/// Modified、Link、Status；只带一个指向后台文章列表的按钮。
///
/// # 参数
/// * `webhook_url` - 目标 webhook URL
/// * `site_url` - 站点基础URL
/// * `post` - 文章
///
/// # 返回
/// * `NotificationCard` - 构建好的卡片
pub fn create_notification(webhook_url: &str, site_url: &str, post: &Post) -> NotificationCard {
    let headline = format!("{}: {}", TITLE_PREFIX, post.title());

    let mut section = CardSection::new();
    if let Some(ref author) = post.author_name {
        section = section.with_fact("Autor", author.as_str());
    }
    let section = section
        .with_fact("Datum", format_timestamp(post.date))
        .with_fact("Modified", format_timestamp(post.modified))
        .with_fact("Link", format!("[{0}]({0})", post.link))
        .with_fact("Status", title_case(&post.status));

    NotificationCard::new(webhook_url)
        .with_title(headline.as_str())
        .with_summary(headline)
        .with_color(THEME_COLOR)
        .with_section(section)
        .with_link_button(
            ADMIN_ACTION_LABEL,
            format!("{}{}", site_url.trim_end_matches('/'), ADMIN_EDIT_PATH),
        )
}

/// 格式化为 `日.月.年 时:分`（24小时制）
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

/// 每个单词首字母大写，其余小写
pub fn title_case(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut at_word_start = true;

    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                output.extend(ch.to_uppercase());
            } else {
                output.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            output.push(ch);
            at_word_start = true;
        }
    }

    output
}
