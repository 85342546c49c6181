// src/cli/notify.rs
//! Notify 命令 - 渲染 GitHub 事件并投递到 Mattermost
//!
//! 所有输入都可以通过环境变量提供，与 GitHub Action 的 `INPUT_*` 约定一致。

use crate::config::{clean, ConfigLayer, Settings};
use crate::error::NotifyError;
use crate::infra::identity::{IdentityDocument, DEFAULT_IDENTITY_FILE};
use crate::notification::{
    DryRunChannel, GithubProfileClient, MattermostChannel, MattermostConfig, NotificationChannel,
    NotificationRenderer, ProfileClientConfig,
};
use crate::{load_event, IDENTITY_INPUT};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Notify 命令参数
#[derive(Args, Debug, Default)]
pub struct NotifyArgs {
    /// 事件类型（如 push、pull_request）
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// 事件 JSON，原文或 base64
    #[arg(long, env = "INPUT_EVENTJSON", hide_env_values = true)]
    pub event_json: Option<String>,

    /// Mattermost incoming webhook URL
    #[arg(long, env = "INPUT_WEBHOOKURL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// 覆盖显示用户名
    #[arg(long, env = "INPUT_SENDERUSERNAME")]
    pub sender_username: Option<String>,

    /// 覆盖头像 URL
    #[arg(long, env = "INPUT_SENDERICONURL")]
    pub sender_icon_url: Option<String>,

    /// 身份文档，原文或 base64
    #[arg(long, env = "INPUT_ZITIID", hide_env_values = true)]
    pub identity: Option<String>,

    /// 身份文档落盘路径
    #[arg(long, env = "INPUT_IDENTITYFILE", default_value = DEFAULT_IDENTITY_FILE)]
    pub identity_file: PathBuf,

    /// GitHub token（资料补充使用）
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// 资料补充超时（秒）；空串视为未设置
    #[arg(long, env = "INPUT_PROFILETIMEOUT", value_name = "SECS")]
    pub profile_timeout_secs: Option<String>,

    /// 投递超时（秒）；空串视为未设置
    #[arg(long, env = "INPUT_DELIVERYTIMEOUT", value_name = "SECS")]
    pub delivery_timeout_secs: Option<String>,

    /// 禁用 watch 事件的资料补充（true/false/1/0/yes/no；空串视为 false）
    #[arg(long, env = "INPUT_NOENRICH", value_name = "BOOL")]
    pub no_enrich: Option<String>,

    /// 只打印 payload，不发送
    #[arg(long)]
    pub dry_run: bool,

    /// 配置文件路径（默认 ~/.config/gh-notify/config.json）
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl NotifyArgs {
    /// 命令行/环境变量这一层配置
    fn config_layer(&self) -> Result<ConfigLayer, NotifyError> {
        Ok(ConfigLayer {
            webhook_url: self.webhook_url.clone(),
            github_token: self.github_token.clone(),
            profile_timeout_secs: parse_secs(
                "INPUT_PROFILETIMEOUT",
                self.profile_timeout_secs.clone(),
            )?,
            delivery_timeout_secs: parse_secs(
                "INPUT_DELIVERYTIMEOUT",
                self.delivery_timeout_secs.clone(),
            )?,
        }
        .cleaned())
    }

    /// 合并配置文件
    pub fn settings(&self) -> Result<Settings> {
        let cli_layer = self.config_layer()?;
        let file_layer = match &self.config {
            Some(path) => ConfigLayer::load(path)?,
            None => ConfigLayer::load_default(),
        };
        Ok(Settings::from(cli_layer.merge(file_layer)))
    }

    /// 是否禁用资料补充
    pub fn enrichment_disabled(&self) -> Result<bool, NotifyError> {
        parse_flag("INPUT_NOENRICH", self.no_enrich.clone())
    }

    /// 按参数构建渲染器
    pub fn renderer(&self, settings: &Settings) -> Result<NotificationRenderer> {
        let mut renderer = NotificationRenderer::new()
            .with_username(clean(self.sender_username.clone()))
            .with_icon_url(clean(self.sender_icon_url.clone()));

        if !self.enrichment_disabled()? {
            let client = GithubProfileClient::new(ProfileClientConfig {
                token: settings.github_token.clone(),
                timeout_secs: settings.profile_timeout_secs,
            })?;
            renderer = renderer.with_profile_lookup(Arc::new(client));
        }

        Ok(renderer)
    }

    /// 按参数构建投递渠道
    pub fn channel(&self, settings: &Settings) -> Result<Box<dyn NotificationChannel>> {
        if self.dry_run {
            return Ok(Box::new(DryRunChannel::new()));
        }

        let webhook_url = settings.webhook_url.clone().ok_or_else(|| {
            NotifyError::Config(
                "no webhook URL, set INPUT_WEBHOOKURL or --webhook-url".to_string(),
            )
        })?;

        Ok(Box::new(MattermostChannel::new(MattermostConfig {
            webhook_url,
            timeout_secs: settings.delivery_timeout_secs,
        })?))
    }
}

/// 秒数；空串视为未设置
fn parse_secs(input: &str, value: Option<String>) -> Result<Option<u64>, NotifyError> {
    clean(value)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|e| {
                NotifyError::Config(format!(
                    "{} must be a number of seconds, got '{}': {}",
                    input, v, e
                ))
            })
        })
        .transpose()
}

/// 布尔开关；空串视为 false
fn parse_flag(input: &str, value: Option<String>) -> Result<bool, NotifyError> {
    let Some(v) = clean(value) else {
        return Ok(false);
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(NotifyError::Config(format!(
            "{} must be true or false, got '{}'",
            input, v
        ))),
    }
}

/// 处理 notify 命令
pub fn handle_notify(args: NotifyArgs) -> Result<()> {
    let event_name = clean(args.event_name.clone()).ok_or_else(|| {
        NotifyError::Config("no event name, set GITHUB_EVENT_NAME or --event-name".to_string())
    })?;

    let settings = args.settings()?;
    let channel = args.channel(&settings)?;

    // 1. 事件文档
    let envelope = load_event(args.event_json.as_deref())?;

    // 2. 身份文档（可选），落盘给外部 transport
    if let Some(raw) = clean(args.identity.clone()) {
        let identity = IdentityDocument::load(IDENTITY_INPUT, Some(&raw))?;
        identity.persist(&args.identity_file)?;
    }

    // 3. 渲染
    let renderer = args.renderer(&settings)?;
    let notification = renderer.render(&event_name, &envelope);

    // 4. 投递
    let result = channel.send(&notification)?;
    info!(
        channel = channel.name(),
        status = ?result.status,
        success = result.is_success(),
        "Notification sent"
    );

    Ok(())
}
