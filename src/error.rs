//! 错误类型
//!
//! 致命错误都会一路传到 `main`，以非零状态退出。
//! 可选字段缺失、资料补充失败等情况不在这里，它们在渲染过程中就地降级。

use std::fmt;

/// 错误分类
#[derive(Debug)]
pub enum NotifyError {
    /// 输入既不是 JSON，也不是任何补齐方式下可解码的 base64 JSON
    NotDecodable {
        /// 输入来源（如 `INPUT_EVENTJSON`）
        input: String,
        /// 安全摘要（只含长度和前 8 个字符）
        hint: String,
    },
    /// 事件文档缺少 `repository` / `sender`，或根本不是 JSON 对象
    MalformedEvent(String),
    /// 投递失败（网络错误或非 2xx 响应）
    Delivery(String),
    /// 配置缺失或非法
    Config(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::NotDecodable { input, hint } => {
                write!(f, "No valid JSON in {} ({})", input, hint)
            }
            NotifyError::MalformedEvent(msg) => write!(f, "Malformed event: {}", msg),
            NotifyError::Delivery(msg) => write!(f, "Delivery failed: {}", msg),
            NotifyError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for NotifyError {}
