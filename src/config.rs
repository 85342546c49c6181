//! 配置加载
//!
//! 优先级：命令行参数 > 环境变量（两者由 clap 合并）> 配置文件 `~/.config/gh-notify/config.json`
//!
//! 配置文件示例：
//! ```json
//! {
//!   "webhook_url": "https://chat.example.com/hooks/xxx",
//!   "github_token": "ghp_...",
//!   "profile_timeout_secs": 5,
//!   "delivery_timeout_secs": 30
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::notification::channels::mattermost::DEFAULT_DELIVERY_TIMEOUT_SECS;
use crate::notification::profile::DEFAULT_PROFILE_TIMEOUT_SECS;

/// 配置层：所有字段可选，高优先级层覆盖低优先级层
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigLayer {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub profile_timeout_secs: Option<u64>,
    #[serde(default)]
    pub delivery_timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/gh-notify/config.json"))
    }

    /// 从文件加载；文件不存在时返回空层
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let layer: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(layer.cleaned())
    }

    /// 加载默认配置文件；出错时记录警告并忽略
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(layer) => layer,
            Err(e) => {
                warn!(error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    /// 合并：self 优先，缺失的字段取 lower
    pub fn merge(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            webhook_url: self.webhook_url.or(lower.webhook_url),
            github_token: self.github_token.or(lower.github_token),
            profile_timeout_secs: self.profile_timeout_secs.or(lower.profile_timeout_secs),
            delivery_timeout_secs: self.delivery_timeout_secs.or(lower.delivery_timeout_secs),
        }
    }

    /// 空字符串视为未设置（GitHub Actions 对未填写的 input 传 ""）
    pub fn cleaned(self) -> Self {
        ConfigLayer {
            webhook_url: clean(self.webhook_url),
            github_token: clean(self.github_token),
            ..self
        }
    }
}

/// 合并后的最终配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: Option<String>,
    pub github_token: Option<String>,
    pub profile_timeout_secs: u64,
    pub delivery_timeout_secs: u64,
}

impl From<ConfigLayer> for Settings {
    fn from(layer: ConfigLayer) -> Self {
        let layer = layer.cleaned();
        Self {
            webhook_url: layer.webhook_url,
            github_token: layer.github_token,
            profile_timeout_secs: layer
                .profile_timeout_secs
                .unwrap_or(DEFAULT_PROFILE_TIMEOUT_SECS),
            delivery_timeout_secs: layer
                .delivery_timeout_secs
                .unwrap_or(DEFAULT_DELIVERY_TIMEOUT_SECS),
        }
    }
}

/// 空字符串转 `None`
pub fn clean(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
