//! Which entity types take part in change capture.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use subtp_model::EntitySchema;
use subtp_types::EntityType;
use tracing::debug;

/// Process-wide set of registered entity types and their field whitelists.
///
/// Registration is deduplicated: registering a type twice keeps a single
/// entry, and one `unregister` removes it.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: RwLock<HashMap<EntityType, Arc<EntitySchema>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type with its schema.
    ///
    /// Returns true if the type was not registered before. Re-registering
    /// replaces the stored schema.
    pub fn register(&self, schema: EntitySchema) -> bool {
        debug!("Registering entity type {} ({} fields)", schema.entity_type, schema.fields.len());
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas
            .insert(schema.entity_type.clone(), Arc::new(schema))
            .is_none()
    }

    /// Unregisters an entity type. Returns false if it was not registered.
    pub fn unregister(&self, entity_type: &EntityType) -> bool {
        debug!("Unregistering entity type {}", entity_type);
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas.remove(entity_type).is_some()
    }

    /// Returns true if the entity type is registered.
    pub fn is_registered(&self, entity_type: &EntityType) -> bool {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.contains_key(entity_type)
    }

    /// Returns the schema of a registered entity type.
    pub fn schema(&self, entity_type: &EntityType) -> Option<Arc<EntitySchema>> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.get(entity_type).cloned()
    }

    /// Returns all registered entity types, sorted by name.
    pub fn entity_types(&self) -> Vec<EntityType> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut types: Vec<EntityType> = schemas.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
