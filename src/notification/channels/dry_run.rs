//! Dry-run 渠道（只打印不发送）

use anyhow::Result;
use std::io::Write;
use std::sync::Mutex;

use crate::notification::channel::{DeliveryResult, NotificationChannel};
use crate::notification::payload::RenderedNotification;

/// 把 payload 以格式化 JSON 写到输出（默认 stdout）
pub struct DryRunChannel {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DryRunChannel {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for DryRunChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for DryRunChannel {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(&self, notification: &RenderedNotification) -> Result<DeliveryResult> {
        let text = serde_json::to_string_pretty(notification)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("dry-run writer poisoned"))?;
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(DeliveryResult::skipped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::payload::{Attachment, Props};
    use std::sync::Arc;

    /// 共享缓冲区，便于断言输出
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dry_run_prints_payload() {
        let buf = SharedBuf::default();
        let channel = DryRunChannel::with_writer(Box::new(buf.clone()));
        let notification = RenderedNotification {
            username: "alice".into(),
            icon_url: "ia".into(),
            text: "title".into(),
            props: Props::card_for("{}"),
            attachment: Attachment::new("body"),
        };

        let result = channel.send(&notification).unwrap();
        assert_eq!(result, DeliveryResult::skipped());

        let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["attachments"][0]["text"], "body");
    }
}
