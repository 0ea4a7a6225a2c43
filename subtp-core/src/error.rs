//! Error types for the change-capture engine.

use subtp_types::{EntityType, InstanceHandle};
use thiserror::Error;

/// Result type for engine operations.
pub type TailResult<T> = Result<T, TailError>;

/// Errors that can occur while observing or publishing changes.
#[derive(Debug, Error)]
pub enum TailError {
    /// An instance was persisted as an update without ever being observed
    /// at construction, so there is no baseline to diff against.
    #[error("no snapshot for {entity_type} instance {handle}: construct hook was never observed")]
    MissingSnapshot {
        entity_type: EntityType,
        handle: InstanceHandle,
    },

    /// A subscriber rejected an event. Delivery stopped at this subscriber.
    #[error("subscriber {index} failed on {event} {entity_type}: {source}")]
    Subscriber {
        index: usize,
        entity_type: EntityType,
        event: subtp_types::EventKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error (reading a config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
