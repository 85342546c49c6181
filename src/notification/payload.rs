//! Payload 结构 - Mattermost incoming webhook 消息体
//!
//! Payload 格式：
//! ```json
//! {
//!   "username": "alice",
//!   "icon_url": "https://avatars.githubusercontent.com/...",
//!   "text": "Push by [alice](...) in [org/repo](...)",
//!   "props": { "card": "```json\n{...}\n```" },
//!   "attachments": [ { "color": "#708090", "text": "...", "thumb_url": "...", "fallback": "..." } ]
//! }
//! ```

use serde::{Serialize, Serializer};

/// 附件（消息的样式化正文）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Attachment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_thumb(mut self, url: &str) -> Self {
        self.thumb_url = Some(url.to_string());
        self
    }

    /// 条件成立时才设置缩略图
    pub fn with_thumb_if(self, condition: bool, url: &str) -> Self {
        if condition {
            self.with_thumb(url)
        } else {
            self
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// 附加属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Props {
    /// 原始事件 JSON（代码块包裹，用于审计/调试）
    pub card: String,
}

impl Props {
    pub fn card_for(raw_event: &str) -> Self {
        Self {
            card: format!("```json\n{}\n```", raw_event),
        }
    }
}

/// 渲染完成的通知（构建后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNotification {
    pub username: String,
    pub icon_url: String,
    /// 标题行（markdown）
    pub text: String,
    pub props: Props,
    /// 恰好一个附件，序列化为单元素数组
    #[serde(rename = "attachments", serialize_with = "single_attachment")]
    pub attachment: Attachment,
}

impl RenderedNotification {
    /// 序列化为 JSON 文本
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// 序列化为 JSON 值
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

fn single_attachment<S: Serializer>(attachment: &Attachment, serializer: S) -> Result<S::Ok, S::Error> {
    [attachment].serialize(serializer)
}
