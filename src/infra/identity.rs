//! 身份文档处理
//!
//! 身份文档（安全通道使用的 identity JSON）与事件文档走同一套归一化逻辑。
//! 本 crate 不建立安全通道，只负责校验并落盘，交给外部 transport 使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use super::decode::{normalize_input, DecodeSource};
use crate::error::NotifyError;

/// 默认落盘文件名
pub const DEFAULT_IDENTITY_FILE: &str = "id.json";

/// 已校验的身份文档
#[derive(Debug, Clone)]
pub struct IdentityDocument {
    /// JSON 原文（已解码）
    pub json: String,
    /// 来源
    pub source: DecodeSource,
}

impl IdentityDocument {
    /// 从原始输入加载（JSON 原文或 base64），必须是 JSON 对象
    pub fn load(input: &str, raw: Option<&str>) -> Result<Self, NotifyError> {
        let decoded = normalize_input(input, raw)?;

        let value: serde_json::Value = serde_json::from_str(&decoded.text).map_err(|e| {
            NotifyError::Config(format!("{} is not valid JSON: {}", input, e))
        })?;
        if !value.is_object() {
            return Err(NotifyError::Config(format!(
                "{} must be a JSON object",
                input
            )));
        }

        info!(input = %input, source = %decoded.source, "Identity document decoded");
        Ok(Self {
            json: decoded.text,
            source: decoded.source,
        })
    }

    /// 原样写入文件，供外部 transport 加载
    pub fn persist(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.json)
            .with_context(|| format!("Failed to write identity file {}", path.display()))?;
        info!(
            path = %path.display(),
            source = %self.source,
            bytes = self.json.len(),
            "Identity file written"
        );
        Ok(())
    }
}
