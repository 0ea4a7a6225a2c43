//! Change capture for ORM-managed entities.
//!
//! Observes an ORM's instance lifecycle and republishes every write as a
//! normalized `create`, `update` or `delete` event.
//!
//! # Architecture
//!
//! - **Registry**: which entity types are observed, with their field whitelists
//! - **SnapshotStore**: last-known attributes per live instance, released on drop
//! - **diff**: the changed attributes between two snapshots
//! - **Publisher**: ordered, synchronous delivery to subscribers
//! - **Tailer**: the construct / persist / delete hooks tying these together
//!
//! Delivery is at-most-once and unordered across instances. Events are not
//! persisted; hand them to a transport through a subscriber such as
//! [`ChannelSubscriber`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use subtp_core::{EventLog, Tailer};
//! use subtp_model::{Entity, EntitySchema};
//!
//! let tailer = Tailer::new();
//! tailer.register(EntitySchema::with_fields("Order", ["status", "total"]));
//! let log = Arc::new(EventLog::new());
//! tailer.add_subscriber(log.clone());
//!
//! let mut order = Entity::new("Order", json!({"status": "new", "total": 10}));
//! let guard = tailer.on_construct(&order).unwrap();
//! order.id = json!(1);
//! tailer.on_persist(guard.handle(), &order, true).unwrap();
//!
//! order.set("status", "paid");
//! tailer.on_persist(guard.handle(), &order, false).unwrap();
//!
//! let events = log.events();
//! assert_eq!(events[1].payload.get("status"), Some(&json!("paid")));
//! assert_eq!(events[1].payload.get("total"), None);
//! ```

mod config;
mod diff;
mod error;
pub mod logging;
mod publisher;
mod registry;
mod snapshot;
mod tailer;

pub use config::TailerConfig;
pub use diff::{diff, has_changes};
pub use error::{TailError, TailResult};
pub use publisher::{ChannelSubscriber, EventLog, Publisher, Subscriber};
pub use registry::Registry;
pub use snapshot::{SnapshotGuard, SnapshotStore};
pub use tailer::Tailer;
