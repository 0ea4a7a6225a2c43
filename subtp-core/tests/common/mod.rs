#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use subtp_core::{EventLog, Tailer};
use subtp_model::{Entity, EntitySchema};
use subtp_types::Snapshot;

pub fn order_schema() -> EntitySchema {
    EntitySchema::with_fields("Order", ["status", "total"])
}

/// A tailer with `Order` registered and an event log attached.
pub fn order_tailer() -> (Tailer, Arc<EventLog>) {
    let tailer = Tailer::new();
    tailer.register(order_schema());
    let log = Arc::new(EventLog::new());
    tailer.add_subscriber(log.clone());
    (tailer, log)
}

pub fn order(data: Value) -> Entity {
    Entity::new("Order", data)
}

pub fn snap(value: Value) -> Snapshot {
    serde_json::from_value(value).unwrap()
}
