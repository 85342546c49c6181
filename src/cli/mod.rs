//! CLI command handling

pub mod decode;
pub mod notify;

pub use decode::*;
pub use notify::*;
