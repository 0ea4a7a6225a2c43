//! Core type definitions for subtp.
//!
//! This crate defines the fundamental types shared by the change-capture
//! engine and its subscribers:
//! - Entity type names and per-instance snapshot handles
//! - Attribute snapshots (field name to JSON value)
//! - Normalized change events (create, update, delete)
//!
//! Nothing here knows about a particular ORM. Hosts describe their
//! entities through `subtp-model` and drive the engine in `subtp-core`.

mod event;
mod ids;

pub use event::{ChangeEvent, EventKind, Payload};
pub use ids::{EntityType, InstanceHandle};

/// Attribute state of one instance: field name to value.
///
/// Keys keep insertion order, which for captured snapshots is the schema's
/// field order. Equality ignores order. Values are compared with JSON
/// equality, so `1` and `1.0` differ.
pub type Snapshot = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),

    #[error("invalid instance handle: {0}")]
    InvalidHandle(String),
}
