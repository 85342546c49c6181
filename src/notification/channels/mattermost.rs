//! Mattermost incoming webhook 渠道
//!
//! 单次 POST，不重试；失败直接返回给调用方。

use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::notification::channel::{DeliveryResult, NotificationChannel};
use crate::notification::payload::RenderedNotification;

/// 默认超时（秒）
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Webhook 渠道配置
#[derive(Debug, Clone)]
pub struct MattermostConfig {
    /// Incoming webhook URL
    pub webhook_url: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for MattermostConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

/// Mattermost webhook 渠道
#[derive(Debug)]
pub struct MattermostChannel {
    client: reqwest::blocking::Client,
    config: MattermostConfig,
}

impl MattermostChannel {
    /// 创建渠道，webhook_url 必填
    pub fn new(config: MattermostConfig) -> Result<Self> {
        if config.webhook_url.is_empty() {
            return Err(NotifyError::Config("webhook_url is required".to_string()).into());
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }
}

impl NotificationChannel for MattermostChannel {
    fn name(&self) -> &str {
        "mattermost"
    }

    fn send(&self, notification: &RenderedNotification) -> Result<DeliveryResult> {
        let keys = notification
            .to_value()?
            .as_object()
            .map(|o| o.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        info!(keys = ?keys, "Posting webhook payload");

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(notification)
            .send()
            .map_err(|e| NotifyError::Delivery(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();
        let body = response
            .text()
            .map_err(|e| NotifyError::Delivery(format!("Failed to read response: {}", e)))?;

        info!(channel = "mattermost", status = status.as_u16(), "Webhook response received");
        debug!(headers = ?headers, body = %body, "Webhook response details");

        if !status.is_success() {
            return Err(NotifyError::Delivery(format!("webhook returned {}: {}", status, body)).into());
        }

        Ok(DeliveryResult {
            status: Some(status.as_u16()),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::payload::{Attachment, Props};

    fn sample() -> RenderedNotification {
        RenderedNotification {
            username: "alice".into(),
            icon_url: "ia".into(),
            text: "title".into(),
            props: Props::card_for("{}"),
            attachment: Attachment::new("body"),
        }
    }

    #[test]
    fn test_config_default() {
        let config = MattermostConfig::default();
        assert_eq!(config.timeout_secs, DEFAULT_DELIVERY_TIMEOUT_SECS);
        assert!(config.webhook_url.is_empty());
    }

    #[test]
    fn test_channel_requires_url() {
        let err = MattermostChannel::new(MattermostConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NotifyError>(),
            Some(NotifyError::Config(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_delivery_failure() {
        let channel = MattermostChannel::new(MattermostConfig {
            webhook_url: "http://127.0.0.1:1/hooks/abc".into(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = channel.send(&sample()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NotifyError>(),
            Some(NotifyError::Delivery(_))
        ));
    }
}
