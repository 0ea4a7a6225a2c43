//! Change event types.
//!
//! Every observed mutation is normalized into one of three kinds. The
//! payload always carries the entity's identifier; `data` holds the full
//! attribute set on create, the changed attributes on update, and is absent
//! on delete or when an update changed nothing.

use crate::{EntityType, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The kind of mutation a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new row was written.
    Create,
    /// An existing row was written again.
    Update,
    /// The row was removed.
    Delete,
}

impl EventKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(crate::Error::InvalidEventKind(other.to_string())),
        }
    }
}

/// The normalized body delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Primary key of the entity. `Null` until storage assigns one.
    pub id: Value,

    /// Attributes carried by the event, omitted when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Snapshot>,
}

impl Payload {
    /// Builds a payload, dropping `data` when it is absent or empty.
    #[must_use]
    pub fn new(id: Value, data: Option<Snapshot>) -> Self {
        Self {
            id,
            data: data.filter(|d| !d.is_empty()),
        }
    }

    /// Returns true if the payload carries attribute data.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Looks up one attribute in the payload data.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(field))
    }
}

/// A complete change event, as handed to downstream transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The entity type that changed.
    pub entity_type: EntityType,

    /// What happened.
    pub event: EventKind,

    /// Identifier and attribute data.
    pub payload: Payload,
}

impl ChangeEvent {
    /// Creates a change event.
    #[must_use]
    pub fn new(entity_type: EntityType, event: EventKind, payload: Payload) -> Self {
        Self {
            entity_type,
            event,
            payload,
        }
    }

    /// Creates a create event carrying the full attribute set.
    #[must_use]
    pub fn created(entity_type: impl Into<EntityType>, id: Value, data: Snapshot) -> Self {
        Self::new(entity_type.into(), EventKind::Create, Payload::new(id, Some(data)))
    }

    /// Creates an update event carrying only the changed attributes.
    #[must_use]
    pub fn updated(entity_type: impl Into<EntityType>, id: Value, delta: Snapshot) -> Self {
        Self::new(entity_type.into(), EventKind::Update, Payload::new(id, Some(delta)))
    }

    /// Creates a delete event. Delete events never carry data.
    #[must_use]
    pub fn deleted(entity_type: impl Into<EntityType>, id: Value) -> Self {
        Self::new(entity_type.into(), EventKind::Delete, Payload::new(id, None))
    }

    /// Serializes the event to JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an event from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
