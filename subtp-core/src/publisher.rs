//! Subscriber list and synchronous event delivery.
//!
//! Events are delivered in registration order on the calling thread. A
//! failing subscriber stops delivery and its error is returned to the
//! lifecycle hook that triggered the publish, which is expected to abort
//! the surrounding persistence operation.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;
use subtp_types::{ChangeEvent, EntityType, EventKind, Payload, Snapshot};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{TailError, TailResult};

/// Receives normalized change events.
///
/// Implementations must not call back into the lifecycle hooks of the
/// same instance; delivery happens while that hook is still running.
pub trait Subscriber: Send + Sync {
    /// Handle one event. Returning `Err` aborts the triggering operation.
    fn on_change(
        &self,
        entity_type: &EntityType,
        event: EventKind,
        payload: &Payload,
    ) -> anyhow::Result<()>;
}

/// Adapts a plain closure to [`Subscriber`].
struct FnSubscriber<F>(F);

impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(&EntityType, EventKind, &Payload) -> anyhow::Result<()> + Send + Sync,
{
    fn on_change(
        &self,
        entity_type: &EntityType,
        event: EventKind,
        payload: &Payload,
    ) -> anyhow::Result<()> {
        (self.0)(entity_type, event, payload)
    }
}

/// Ordered subscriber list. Duplicate registrations deliver twice.
#[derive(Default)]
pub struct Publisher {
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
    log_payloads: bool,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.len())
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

impl Publisher {
    /// Creates a publisher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes attribute values in debug logs when set.
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Appends a closure subscriber.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&EntityType, EventKind, &Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_subscriber(Arc::new(FnSubscriber(callback)));
    }

    /// Appends a subscriber.
    pub fn add_subscriber(&self, subscriber: Arc<dyn Subscriber>) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.push(subscriber);
        debug!("Added subscriber ({} total)", subscribers.len());
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the payload and delivers it to every subscriber in order.
    ///
    /// `data` is left out of the payload when `attributes` is `None` or empty.
    pub fn publish(
        &self,
        entity_type: &EntityType,
        event: EventKind,
        id: Value,
        attributes: Option<Snapshot>,
    ) -> TailResult<()> {
        let payload = Payload::new(id, attributes);
        if self.log_payloads {
            debug!(
                "publish(entity_type={}, event={}, id={}, data={:?})",
                entity_type, event, payload.id, payload.data
            );
        } else {
            debug!(
                "publish(entity_type={}, event={}, id={}, fields={:?})",
                entity_type,
                event,
                payload.id,
                payload.data.as_ref().map(|d| d.keys().collect::<Vec<_>>())
            );
        }

        // Deliver from a copy so subscribers may register further subscribers.
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (index, subscriber) in subscribers.iter().enumerate() {
            subscriber
                .on_change(entity_type, event, &payload)
                .map_err(|e| TailError::Subscriber {
                    index,
                    entity_type: entity_type.clone(),
                    event,
                    source: e.into(),
                })?;
        }
        Ok(())
    }
}

/// Records every event it receives. Mostly useful in tests and for
/// hosts that drain events in batches.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ChangeEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events, oldest first.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Removes and returns all recorded events.
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Subscriber for EventLog {
    fn on_change(
        &self,
        entity_type: &EntityType,
        event: EventKind,
        payload: &Payload,
    ) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ChangeEvent::new(entity_type.clone(), event, payload.clone()));
        Ok(())
    }
}

/// Forwards events into a tokio channel for an async downstream transport.
///
/// A dropped receiver is reported as a subscriber failure.
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChannelSubscriber {
    pub fn new(tx: mpsc::UnboundedSender<ChangeEvent>) -> Self {
        Self { tx }
    }

    /// Creates a subscriber together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn on_change(
        &self,
        entity_type: &EntityType,
        event: EventKind,
        payload: &Payload,
    ) -> anyhow::Result<()> {
        self.tx
            .send(ChangeEvent::new(entity_type.clone(), event, payload.clone()))
            .map_err(|_| anyhow::anyhow!("change event receiver dropped"))
    }
}
