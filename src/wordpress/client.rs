//! WordPress REST API 客户端
//!
//! 负责查询最近修改的文章以及作者信息。同一次运行中的所有请求共用一个
//! 带 basic auth 凭据的HTTP客户端。

use crate::config::types::{Config, FetchFailurePolicy};
use crate::error::{FetchError, Result};
use crate::wordpress::types::{cutoff_from, format_cutoff, Author, Post, PostStatus};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// WordPress 内容API客户端
pub struct WordPressClient {
    /// HTTP客户端
    client: Client,
    /// 站点基础URL（不含结尾的 `/`）
    base_url: String,
    /// API用户名
    username: String,
    /// 应用程序密码
    application_password: String,
    /// 回溯窗口（小时）
    lookback_hours: u64,
    /// 获取失败策略
    failure_policy: FetchFailurePolicy,
}

impl WordPressClient {
    /// 创建新的内容API客户端
    ///
    /// # 参数
    /// * `config` - 应用配置
    ///
    /// # 返回
    /// * `Result<Self>` - 客户端实例
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.run.request_timeout_seconds))
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(FetchError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.wordpress.base_url.trim_end_matches('/').to_string(),
            username: config.wordpress.username.clone(),
            application_password: config.wordpress.application_password.clone(),
            lookback_hours: config.run.lookback_hours,
            failure_policy: config.run.fetch_failure_policy,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.base_url, path)
    }

    /// 执行带认证的GET请求并解析JSON响应
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, FetchError> {
        debug!("请求内容API: url={}, params={:?}", url, query);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.application_password))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::MalformedRecord {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// 获取回溯窗口内创建或修改的文章（所有发布状态）
    ///
    /// 传输错误和非2xx响应按配置的失败策略处理：`empty` 时记录警告并返回
    /// 空列表，`abort` 时向上传播。记录格式错误总是向上传播。
    /// 向上传播的错误由入口统一记录。
    ///
    /// # 参数
    /// * `now` - 当前本地时间
    ///
    /// # 返回
    /// * `Result<Vec<Post>>` - 按API返回顺序排列的文章
    pub async fn fetch_latest_posts(&self, now: NaiveDateTime) -> Result<Vec<Post>> {
        let url = self.endpoint("posts");
        let cutoff = cutoff_from(now, self.lookback_hours);

        let mut query: Vec<(&str, String)> = PostStatus::ALL
            .iter()
            .map(|status| ("status[]", status.as_str().to_string()))
            .collect();
        query.push(("modified_after", format_cutoff(cutoff)));

        match self.get_json::<Vec<Post>>(&url, &query).await {
            Ok(posts) => Ok(filter_modified_since(posts, cutoff)),
            Err(e) if e.is_transport() && self.failure_policy == FetchFailurePolicy::Empty => {
                warn!("从 {} 获取文章失败，按 empty 策略继续: {}", url, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 获取作者信息
    ///
    /// 不做缓存；任何失败都会向上传播并中止本次运行。
    pub async fn fetch_author(&self, author_id: u64) -> Result<Author> {
        let url = self.endpoint(&format!("users/{author_id}"));
        Ok(self.get_json::<Author>(&url, &[]).await?)
    }

    /// 查询并附加文章的作者显示名
    pub async fn resolve_author(&self, post: Post) -> Result<Post> {
        let author = self.fetch_author(post.author).await?;
        Ok(post.with_author_name(author.name))
    }
}

/// 丢弃修改时间早于截止时间的文章，保持原有顺序
pub fn filter_modified_since(posts: Vec<Post>, cutoff: NaiveDateTime) -> Vec<Post> {
    let total = posts.len();
    let recent: Vec<Post> = posts
        .into_iter()
        .filter(|post| post.modified_since(cutoff))
        .collect();

    if recent.len() < total {
        debug!(
            "丢弃 {} 篇早于截止时间 {} 的文章",
            total - recent.len(),
            cutoff
        );
    }
    recent
}
