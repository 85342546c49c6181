//! GitHub 事件模型 - 事件类型与事件文档

pub mod envelope;
pub mod kind;

pub use envelope::{Actor, EventEnvelope, Facet, Repository};
pub use kind::{display_name, EventKind};
