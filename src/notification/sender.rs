//! 通知发送器模块
//!
//! 定义通知发送的trait和演练模式实现

use crate::error::Result;
use crate::notification::card::NotificationCard;
use async_trait::async_trait;
use tracing::info;

/// 单次投递的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 已发送到 webhook
    Sent,
    /// 演练模式，未发送
    Skipped,
}

/// 通知发送器trait
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 投递一张卡片，失败不重试
    ///
    /// # 参数
    /// * `card` - 通知卡片
    ///
    /// # 返回
    /// * `Result<DeliveryOutcome>` - 投递结果
    async fn deliver(&self, card: &NotificationCard) -> Result<DeliveryOutcome>;
}

/// 演练模式发送器，只记录日志，不发起任何网络请求
pub struct DryRunSender;

#[async_trait]
impl NotificationSender for DryRunSender {
    async fn deliver(&self, card: &NotificationCard) -> Result<DeliveryOutcome> {
        info!("演练模式，不发送消息: {}", card.title());
        Ok(DeliveryOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_sender_skips() {
        let card = NotificationCard::new("http://127.0.0.1:1/unreachable").with_title("t");
        let outcome = DryRunSender.deliver(&card).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Skipped);
    }
}
