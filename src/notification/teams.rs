//! Teams 通知发送器模块
//!
//! 实现 Teams 传入 webhook 的卡片投递

use crate::error::{NotificationError, Result};
use crate::notification::card::NotificationCard;
use crate::notification::sender::{DeliveryOutcome, NotificationSender};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Teams 通知发送器
pub struct TeamsSender {
    /// HTTP客户端
    client: Client,
}

impl TeamsSender {
    /// 创建新的 Teams 发送器
    ///
    /// # 参数
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 发送器实例
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| NotificationError::SendError(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationSender for TeamsSender {
    async fn deliver(&self, card: &NotificationCard) -> Result<DeliveryOutcome> {
        let body = card.to_json()?;
        debug!("发送消息到 Teams webhook");

        let response = self
            .client
            .post(card.webhook_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::SendError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!("Teams 消息发送成功");
            Ok(DeliveryOutcome::Sent)
        } else {
            let text = response.text().await.unwrap_or_default();
            error!("Teams 消息发送失败: {} - {}", status, text);
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                body: text,
            }
            .into())
        }
    }
}
