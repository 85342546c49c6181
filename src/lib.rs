//! gh-notify - 将 GitHub 仓库事件渲染为 Mattermost 通知
//!
//! 流程：环境变量 → 输入归一化 → 事件模型 → 渲染 → 投递

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod infra;
pub mod notification;

pub use error::NotifyError;
pub use event::{Actor, EventEnvelope, EventKind, Facet, Repository};
pub use infra::{normalize, safe_hint, DecodeSource, DecodedJson, IdentityDocument};
pub use notification::{
    Attachment, DeliveryResult, NotificationChannel, NotificationRenderer, ProfileDetails,
    ProfileLookup, RenderedNotification,
};

use tracing::info;

/// 事件文档输入名
pub const EVENT_INPUT: &str = "INPUT_EVENTJSON";

/// 身份文档输入名
pub const IDENTITY_INPUT: &str = "INPUT_ZITIID";

/// 归一化并解析事件文档
pub fn load_event(raw: Option<&str>) -> Result<EventEnvelope, NotifyError> {
    let decoded = infra::normalize_input(EVENT_INPUT, raw)?;
    info!(input = EVENT_INPUT, source = %decoded.source, "Event JSON decoded");
    EventEnvelope::parse(&decoded.text)
}

/// 完整渲染：原始输入 → 通知
pub fn render_event(
    renderer: &NotificationRenderer,
    kind: &str,
    raw: Option<&str>,
) -> Result<RenderedNotification, NotifyError> {
    let envelope = load_event(raw)?;
    Ok(renderer.render(kind, &envelope))
}
