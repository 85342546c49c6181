//! 通知渠道 trait 定义

use anyhow::Result;

use super::payload::RenderedNotification;

/// 投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// HTTP 状态码（dry-run 为 `None`）
    pub status: Option<u16>,
    /// 响应头 (name, value)
    pub headers: Vec<(String, String)>,
    /// 响应体
    pub body: String,
}

impl DeliveryResult {
    /// 未实际发送
    pub fn skipped() -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self.status {
            Some(code) => (200..300).contains(&code),
            None => true,
        }
    }
}

/// 通知渠道 trait
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送通知；网络错误或非 2xx 响应返回 `NotifyError::Delivery`
    fn send(&self, notification: &RenderedNotification) -> Result<DeliveryResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_result_success() {
        let ok = DeliveryResult {
            status: Some(200),
            headers: vec![],
            body: "ok".into(),
        };
        assert!(ok.is_success());

        let bad = DeliveryResult {
            status: Some(400),
            ..ok.clone()
        };
        assert!(!bad.is_success());

        assert!(DeliveryResult::skipped().is_success());
    }
}
