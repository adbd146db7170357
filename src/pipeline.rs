//! 通知流水线
//!
//! 获取 → 查询作者 → 格式化 → 投递，严格按顺序逐篇处理。两次真实投递
//! 之间固定暂停，任何未处理的错误都会中止剩余文章。

use crate::config::Config;
use crate::error::Result;
use crate::notification::{
    create_notification, DeliveryOutcome, DryRunSender, NotificationSender, TeamsSender,
};
use crate::wordpress::{Post, WordPressClient};
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tracing::{debug, info, Level};

/// 单次运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 获取到的文章数
    pub fetched: usize,
    /// 实际发送的卡片数
    pub delivered: usize,
    /// 演练模式下跳过的卡片数
    pub skipped: usize,
}

/// 通知流水线
pub struct Pipeline<'a> {
    config: &'a Config,
    source: WordPressClient,
    sender: Box<dyn NotificationSender>,
}

impl<'a> Pipeline<'a> {
    /// 根据配置创建流水线，演练模式下使用不联网的发送器
    pub fn new(config: &'a Config) -> Result<Self> {
        let sender: Box<dyn NotificationSender> = if config.run.dry_run {
            Box::new(DryRunSender)
        } else {
            Box::new(TeamsSender::new(Duration::from_secs(
                config.run.request_timeout_seconds,
            ))?)
        };

        Self::with_sender(config, sender)
    }

    /// 使用指定的发送器创建流水线
    ///
    /// # 参数
    /// * `config` - 应用配置
    /// * `sender` - 通知发送器
    pub fn with_sender(config: &'a Config, sender: Box<dyn NotificationSender>) -> Result<Self> {
        Ok(Self {
            config,
            source: WordPressClient::new(config)?,
            sender,
        })
    }

    /// 以当前本地时间为基准运行一次
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Local::now().naive_local()).await
    }

    /// 以指定时间为基准运行一次
    pub async fn run_at(&self, now: NaiveDateTime) -> Result<RunSummary> {
        let posts = self.source.fetch_latest_posts(now).await?;
        info!("找到 {} 篇最近创建或修改的文章", posts.len());
        self.deliver_posts(posts).await
    }

    /// 按顺序逐篇格式化并投递，每次真实发送后暂停固定间隔
    ///
    /// 第一个错误会中止剩余文章。
    pub async fn deliver_posts(&self, posts: Vec<Post>) -> Result<RunSummary> {
        let mut summary = RunSummary {
            fetched: posts.len(),
            ..RunSummary::default()
        };
        let delay = Duration::from_secs(self.config.run.delivery_delay_seconds);

        for post in posts {
            let post = if self.config.run.resolve_authors {
                self.source.resolve_author(post).await?
            } else {
                post
            };
            self.log_post(&post);

            let card = create_notification(
                &self.config.teams.webhook_url,
                &self.config.wordpress.base_url,
                &post,
            );
            if tracing::enabled!(Level::DEBUG) {
                debug!("消息内容: {}", card.to_pretty_json()?);
            }

            match self.sender.deliver(&card).await? {
                DeliveryOutcome::Sent => {
                    summary.delivered += 1;
                    tokio::time::sleep(delay).await;
                }
                DeliveryOutcome::Skipped => {
                    debug!("演练模式，不发送消息，继续处理下一篇");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "处理完成: 获取 {} 篇，发送 {} 条，跳过 {} 条",
            summary.fetched, summary.delivered, summary.skipped
        );
        Ok(summary)
    }

    fn log_post(&self, post: &Post) {
        info!("Title: {}", post.title());
        match post.author_name {
            Some(ref name) => info!("Author: {}", name),
            None => info!("Author: {}", post.author),
        }
        info!("Date: {}, Modified: {}", post.date, post.modified);
        debug!("Link: {}", post.link);
        debug!("Status: {}", post.status);
        debug!("Dry Run: {}", self.config.run.dry_run);
    }
}
