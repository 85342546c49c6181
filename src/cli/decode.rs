// src/cli/decode.rs
//! Decode 命令 - 调试用，输出归一化后的 JSON

use crate::infra::decode::normalize_input;
use anyhow::Result;
use clap::Args;
use tracing::info;

/// Decode 命令参数
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// JSON 原文或 base64；缺省时读取 INPUT_EVENTJSON
    #[arg(env = "INPUT_EVENTJSON", hide_env_values = true)]
    pub input: Option<String>,

    /// 格式化输出
    #[arg(long)]
    pub pretty: bool,
}

/// 归一化并返回要输出的文本
pub fn decode_to_string(args: &DecodeArgs) -> Result<String> {
    let decoded = normalize_input("input", args.input.as_deref())?;
    info!(source = %decoded.source, "Input decoded");

    if args.pretty {
        let value: serde_json::Value = serde_json::from_str(&decoded.text)?;
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(decoded.text)
    }
}

/// 处理 decode 命令
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    println!("{}", decode_to_string(&args)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        let args = DecodeArgs {
            input: Some("eyJhIjoxfQ".into()),
            pretty: false,
        };
        assert_eq!(decode_to_string(&args).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_decode_pretty() {
        let args = DecodeArgs {
            input: Some(r#"{"a":1}"#.into()),
            pretty: true,
        };
        assert_eq!(decode_to_string(&args).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_decode_missing_input() {
        let args = DecodeArgs {
            input: None,
            pretty: false,
        };
        assert!(decode_to_string(&args).is_err());
    }
}
