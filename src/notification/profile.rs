//! 用户资料补充 - 仅 watch（star）事件使用
//!
//! 尽力而为：任何失败（网络、超时、响应格式）都只记日志，渲染继续进行。

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::event::Actor;

/// 默认超时（秒）
pub const DEFAULT_PROFILE_TIMEOUT_SECS: u64 = 5;

const USER_AGENT: &str = concat!("gh-notify/", env!("CARGO_PKG_VERSION"));

/// 用户资料（GitHub users API 的子集）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProfileDetails {
    /// 按固定顺序输出非空字段：(标签, 值)
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Name", &self.name),
            ("Company", &self.company),
            ("Location", &self.location),
            ("Email", &self.email),
            ("Twitter", &self.twitter_username),
            ("Blog", &self.blog),
            ("Bio", &self.bio),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

/// 资料查询接口
pub trait ProfileLookup: Send + Sync {
    fn lookup(&self, actor: &Actor) -> Result<ProfileDetails>;
}

/// 资料查询客户端配置
#[derive(Debug, Clone)]
pub struct ProfileClientConfig {
    /// API token（可选，提高限额）
    pub token: Option<String>,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for ProfileClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout_secs: DEFAULT_PROFILE_TIMEOUT_SECS,
        }
    }
}

/// 基于 GitHub REST API 的资料查询
pub struct GithubProfileClient {
    client: reqwest::blocking::Client,
    config: ProfileClientConfig,
}

impl GithubProfileClient {
    pub fn new(config: ProfileClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }
}

impl ProfileLookup for GithubProfileClient {
    fn lookup(&self, actor: &Actor) -> Result<ProfileDetails> {
        if actor.url.is_empty() {
            return Err(anyhow!("sender has no API url"));
        }

        let mut request = self
            .client
            .get(&actor.url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let start = std::time::Instant::now();
        let response = request
            .send()
            .map_err(|e| anyhow!("Profile request failed: {}", e))?;

        let status = response.status();
        info!(status = %status, elapsed_ms = start.elapsed().as_millis(), "Get user info response");

        let body = response
            .text()
            .map_err(|e| anyhow!("Failed to read profile response: {}", e))?;
        if !status.is_success() {
            return Err(anyhow!("Profile API error ({})", status));
        }
        debug!(body_len = body.len(), "Profile response received");

        serde_json::from_str(&body).map_err(|e| anyhow!("Failed to parse profile response: {}", e))
    }
}
