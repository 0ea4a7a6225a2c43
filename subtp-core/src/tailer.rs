//! Lifecycle hooks: the entry points a host ORM calls.
//!
//! Per instance the expected sequence is construct, zero or more
//! persists, then an optional delete:
//!
//! - [`Tailer::on_construct`] snapshots the whitelisted attributes and hands
//!   back the guard that frees the snapshot when the instance goes away.
//! - [`Tailer::on_persist`] publishes `create` with the full attribute set,
//!   or `update` with the delta against the stored snapshot, then replaces
//!   the snapshot.
//! - [`Tailer::on_delete`] publishes `delete` without data.
//!
//! Every hook is a no-op for unregistered entity types. Hooks for one
//! instance must not run concurrently; the host serializes them.

use std::sync::Arc;

use subtp_model::{EntitySchema, Observable};
use subtp_types::{EntityType, EventKind, InstanceHandle, Payload, Snapshot};
use tracing::debug;

use crate::config::TailerConfig;
use crate::diff::diff;
use crate::error::{TailError, TailResult};
use crate::publisher::{Publisher, Subscriber};
use crate::registry::Registry;
use crate::snapshot::{SnapshotGuard, SnapshotStore};

/// Change-capture context: registry, snapshot store and subscribers.
///
/// Build one at startup and share it (it is `Send + Sync`) with whatever
/// dispatches the ORM's lifecycle signals.
#[derive(Debug, Default)]
pub struct Tailer {
    registry: Registry,
    snapshots: SnapshotStore,
    publisher: Publisher,
}

impl Tailer {
    /// Creates a tailer with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tailer and registers the configured entity types.
    pub fn from_config(config: &TailerConfig) -> Self {
        let tailer = Self {
            registry: Registry::new(),
            snapshots: SnapshotStore::new(),
            publisher: Publisher::new().with_payload_logging(config.log_payloads),
        };
        for schema in &config.entities {
            tailer.register(schema.clone());
        }
        tailer
    }

    // ── Registration ─────────────────────────────────────────────

    /// Starts observing an entity type. Returns false if it already was.
    pub fn register(&self, schema: EntitySchema) -> bool {
        self.registry.register(schema)
    }

    /// Stops observing an entity type. Unknown types are ignored.
    pub fn unregister(&self, entity_type: impl Into<EntityType>) -> bool {
        self.registry.unregister(&entity_type.into())
    }

    pub fn is_registered(&self, entity_type: &EntityType) -> bool {
        self.registry.is_registered(entity_type)
    }

    /// Appends a closure subscriber.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&EntityType, EventKind, &Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.publisher.add_callback(callback);
    }

    /// Appends a subscriber.
    pub fn add_subscriber(&self, subscriber: Arc<dyn Subscriber>) {
        self.publisher.add_subscriber(subscriber);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Reads an instance's whitelisted attributes, or `None` if its type is
    /// not registered.
    pub fn attributes_of<O: Observable + ?Sized>(&self, instance: &O) -> Option<Snapshot> {
        self.registry
            .schema(instance.entity_type())
            .map(|schema| schema.snapshot_of(instance))
    }

    // ── Hooks ────────────────────────────────────────────────────

    /// Called once, right after an instance exists in memory.
    ///
    /// Returns `None` for unregistered types. Otherwise the host must keep
    /// the guard for as long as the instance lives and pass
    /// [`SnapshotGuard::handle`] to [`on_persist`](Self::on_persist).
    pub fn on_construct<O: Observable + ?Sized>(&self, instance: &O) -> Option<SnapshotGuard> {
        let attributes = self.attributes_of(instance)?;
        let handle = self.snapshots.issue_handle();
        debug!(
            "on_construct({}) -> {} with {} fields",
            instance.entity_type(),
            handle,
            attributes.len()
        );
        self.snapshots.capture(handle, attributes);
        Some(self.snapshots.guard(handle))
    }

    /// Called after every successful write of the instance to storage.
    ///
    /// `created` is the ORM's report that the write inserted a new row.
    /// Updating an instance whose construction was never observed fails
    /// with [`TailError::MissingSnapshot`]. If a subscriber fails, the
    /// stored snapshot is left as it was. A baseline is only stored for a
    /// handle whose guard is still alive.
    pub fn on_persist<O: Observable + ?Sized>(
        &self,
        handle: InstanceHandle,
        instance: &O,
        created: bool,
    ) -> TailResult<()> {
        let entity_type = instance.entity_type();
        let Some(current) = self.attributes_of(instance) else {
            return Ok(());
        };
        let id = instance.primary_key();
        debug!("on_persist({}, {}, created={})", entity_type, handle, created);

        if created {
            self.publisher
                .publish(entity_type, EventKind::Create, id, Some(current.clone()))?;
        } else {
            let previous = self
                .snapshots
                .get(handle)
                .ok_or_else(|| TailError::MissingSnapshot {
                    entity_type: entity_type.clone(),
                    handle,
                })?;
            let delta = diff(&current, &previous);
            debug!("{} changed {} of {} fields", handle, delta.len(), current.len());
            self.publisher
                .publish(entity_type, EventKind::Update, id, Some(delta))?;
        }

        if !self.snapshots.replace(handle, current) {
            debug!("{} has no live snapshot; not storing a new baseline", handle);
        }
        Ok(())
    }

    /// Called after the instance's row was removed from storage.
    ///
    /// The snapshot is not touched here; it goes away with the guard.
    pub fn on_delete<O: Observable + ?Sized>(&self, instance: &O) -> TailResult<()> {
        let entity_type = instance.entity_type();
        if !self.registry.is_registered(entity_type) {
            return Ok(());
        }
        debug!("on_delete({})", entity_type);
        self.publisher
            .publish(entity_type, EventKind::Delete, instance.primary_key(), None)
    }
}
