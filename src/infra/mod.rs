//! 基础设施层 - 输入归一化、身份文档

pub mod decode;
pub mod identity;

pub use decode::{normalize, normalize_input, safe_hint, DecodeSource, DecodedJson};
pub use identity::{IdentityDocument, DEFAULT_IDENTITY_FILE};
