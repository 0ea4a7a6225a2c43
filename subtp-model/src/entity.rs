use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtp_types::EntityType;

/// What the engine needs to read from a live ORM instance.
///
/// Hosts implement this for their model types. Only fields named in the
/// registered schema are ever requested.
pub trait Observable {
    /// The entity type the instance belongs to.
    fn entity_type(&self) -> &EntityType;

    /// Current value of one attribute, or `None` if the instance lacks it.
    fn attribute(&self, field: &str) -> Option<Value>;

    /// Primary key, `Value::Null` until storage assigns one.
    fn primary_key(&self) -> Value;
}

/// A generic entity record backed by a JSON object.
///
/// Top-level keys of `data` are the entity's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityType,
    #[serde(default)]
    pub id: Value,
    pub data: Value,
}

impl Entity {
    /// Creates an entity with no primary key yet.
    pub fn new(entity_type: impl Into<EntityType>, data: Value) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: Value::Null,
            data,
        }
    }

    /// Sets the primary key.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = id.into();
        self
    }

    /// Assigns one top-level attribute. Non-object data is replaced by an object.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        if !self.data.is_object() {
            self.data = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(field.to_string(), value.into());
        }
    }
}

impl Observable for Entity {
    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn attribute(&self, field: &str) -> Option<Value> {
        self.data.get(field).cloned()
    }

    fn primary_key(&self) -> Value {
        self.id.clone()
    }
}
