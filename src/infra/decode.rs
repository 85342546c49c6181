//! 输入归一化 - 自动识别 JSON 原文或 base64 编码的 JSON
//!
//! GitHub Action 的调用方有时直接传 JSON，有时传 base64（还可能丢了 `=` 补齐）。
//! 识别顺序固定，下游依赖这个顺序：
//! 1. 原文能解析为 JSON，直接返回
//! 2. 严格 base64 解码
//! 3. 宽松 base64 解码（丢弃非字母表字符，补齐完成即停止）
//! 4. 依次追加 1~4 个 `=` 后再宽松解码
//!
//! 每一步的结果都必须是合法 UTF-8 且能解析为 JSON 才算成功。

use base64::alphabet;
use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::de::IgnoredAny;

use crate::error::NotifyError;

/// 宽松解码引擎：允许末尾多余位，补齐仍需规范（缺失的补齐由重试步骤补上）
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// 最多追加的 `=` 个数
const MAX_EXTRA_PADDING: usize = 4;

/// 解码来源（用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSource {
    /// 原文即 JSON
    Literal,
    /// 严格 base64
    Base64Strict,
    /// 宽松 base64
    Base64Lenient,
    /// 追加 n 个 `=` 后的宽松 base64
    Base64Padded(usize),
}

impl std::fmt::Display for DecodeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeSource::Literal => write!(f, "literal JSON"),
            DecodeSource::Base64Strict => write!(f, "base64 (strict)"),
            DecodeSource::Base64Lenient => write!(f, "base64 (lenient)"),
            DecodeSource::Base64Padded(n) => write!(f, "base64 (lenient, +{} padding)", n),
        }
    }
}

/// 归一化后的 JSON 文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedJson {
    /// JSON 文本（原文或解码结果）
    pub text: String,
    /// 来源
    pub source: DecodeSource,
}

/// 文本能否解析为 JSON
pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}

/// 归一化输入；无法得到 JSON 时返回 `None`
pub fn normalize(raw: Option<&str>) -> Option<DecodedJson> {
    let raw = raw.filter(|s| !s.is_empty())?;

    if is_json(raw) {
        return Some(DecodedJson {
            text: raw.to_string(),
            source: DecodeSource::Literal,
        });
    }

    if let Some(text) = decode_json(&general_purpose::STANDARD, raw) {
        return Some(DecodedJson {
            text,
            source: DecodeSource::Base64Strict,
        });
    }

    if let Some(text) = decode_lenient(raw) {
        return Some(DecodedJson {
            text,
            source: DecodeSource::Base64Lenient,
        });
    }

    (1..=MAX_EXTRA_PADDING).find_map(|n| {
        let padded = format!("{}{}", raw, "=".repeat(n));
        decode_lenient(&padded).map(|text| DecodedJson {
            text,
            source: DecodeSource::Base64Padded(n),
        })
    })
}

/// 归一化命名输入，失败时转换为 `NotifyError::NotDecodable`
pub fn normalize_input(input: &str, raw: Option<&str>) -> Result<DecodedJson, NotifyError> {
    normalize(raw).ok_or_else(|| NotifyError::NotDecodable {
        input: input.to_string(),
        hint: safe_hint(raw),
    })
}

/// 输入的安全摘要：长度 + 前 8 个字符，绝不输出完整内容
pub fn safe_hint(raw: Option<&str>) -> String {
    match raw {
        None => "<none>".to_string(),
        Some(s) => {
            let head: String = s.chars().take(8).collect::<String>().replace('\n', " ");
            format!("len={}, startswith='{}...'", s.chars().count(), head)
        }
    }
}

fn decode_json(engine: &GeneralPurpose, data: &str) -> Option<String> {
    let bytes = engine.decode(data).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    is_json(&text).then_some(text)
}

fn decode_lenient(raw: &str) -> Option<String> {
    decode_json(&LENIENT, &sanitize_lenient(raw))
}

/// 宽松预处理：
/// - 丢弃字母表以外的字符（包括空白）
/// - 数据不足两位时出现的 `=` 被忽略
/// - 一组的补齐完成后立即截断，后面的内容全部丢弃
///
/// 补齐不完整时原样返回，由后续解码失败。
fn sanitize_lenient(raw: &str) -> String {
    let mut data = String::with_capacity(raw.len());
    let mut quad_pos = 0usize;
    let mut pads = 0usize;

    for ch in raw.chars() {
        if ch == '=' {
            if quad_pos >= 2 {
                pads += 1;
                if quad_pos + pads >= 4 {
                    data.push_str(&"=".repeat(4 - quad_pos));
                    return data;
                }
            }
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || ch == '+' || ch == '/') {
            continue;
        }
        pads = 0;
        data.push(ch);
        quad_pos = (quad_pos + 1) % 4;
    }

    data
}
