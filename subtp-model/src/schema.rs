use crate::Observable;
use serde::{Deserialize, Serialize};
use subtp_types::{EntityType, Snapshot};

/// Declares which attributes of an entity type take part in change capture.
///
/// Field order is the declaration order and is preserved through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: EntityType,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl EntitySchema {
    /// Creates a schema with no fields.
    pub fn new(entity_type: impl Into<EntityType>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a schema from a list of field names.
    pub fn with_fields<I, S>(entity_type: impl Into<EntityType>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::new(entity_type);
        for f in fields {
            schema = schema.field(f);
        }
        schema
    }

    /// Appends a field to the whitelist. Repeated names are ignored.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    /// Returns true if `name` is on the whitelist.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Reads the whitelisted attributes an instance currently holds.
    ///
    /// Fields the instance does not expose are left out of the snapshot
    /// rather than recorded as null.
    pub fn snapshot_of<O: Observable + ?Sized>(&self, instance: &O) -> Snapshot {
        self.fields
            .iter()
            .filter_map(|f| instance.attribute(f).map(|v| (f.clone(), v)))
            .collect()
    }
}
