//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! log_filter = "subtp_core=debug"
//! log_payloads = false
//!
//! [[entities]]
//! entity_type = "Order"
//! fields = ["id", "status", "total"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use subtp_model::EntitySchema;

use crate::error::TailResult;

/// Configuration for a [`Tailer`](crate::Tailer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TailerConfig {
    /// Default `tracing` filter, used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Include attribute values in debug logs. Off by default since
    /// attributes may hold personal data.
    pub log_payloads: bool,
    /// Entity types registered at startup.
    pub entities: Vec<EntitySchema>,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_payloads: false,
            entities: Vec::new(),
        }
    }
}

impl TailerConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> TailResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> TailResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Adds an entity schema to register at startup.
    pub fn with_entity(mut self, schema: EntitySchema) -> Self {
        self.entities.push(schema);
        self
    }
}
