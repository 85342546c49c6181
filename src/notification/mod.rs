//! 通知层 - 事件渲染与投递
//!
//! # 组成
//! 1. `formatter`：按事件类型渲染标题、附件正文、颜色和缩略图
//! 2. `profile`：watch 事件的用户资料补充（尽力而为）
//! 3. `payload`：Mattermost webhook 消息体
//! 4. `channel` / `channels`：投递渠道（webhook、dry-run）
//!
//! # 使用示例
//! ```ignore
//! use gh_notify::event::EventEnvelope;
//! use gh_notify::notification::NotificationRenderer;
//!
//! let env = EventEnvelope::parse(&event_json)?;
//! let notification = NotificationRenderer::new().render("push", &env);
//! println!("{}", notification.to_json()?);
//! ```

pub mod channel;
pub mod channels;
pub mod formatter;
pub mod payload;
pub mod profile;

pub use channel::{DeliveryResult, NotificationChannel};
pub use channels::{DryRunChannel, MattermostChannel, MattermostConfig};
pub use formatter::{handler_for, style, title_line, Handler, NotificationRenderer};
pub use payload::{Attachment, Props, RenderedNotification};
pub use profile::{GithubProfileClient, ProfileClientConfig, ProfileDetails, ProfileLookup};
