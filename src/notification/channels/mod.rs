//! 具体渠道实现

pub mod dry_run;
pub mod mattermost;

pub use dry_run::DryRunChannel;
pub use mattermost::{MattermostChannel, MattermostConfig};
