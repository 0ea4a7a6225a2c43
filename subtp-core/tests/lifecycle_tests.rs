mod common;

use common::{order, order_tailer, snap};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use subtp_core::{TailError, Tailer};
use subtp_model::{Entity, EntitySchema};
use subtp_types::{ChangeEvent, EventKind, InstanceHandle};

// ── Create ───────────────────────────────────────────────────────

#[test]
fn construct_does_not_publish() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new", "total": 10}));
    let guard = tailer.on_construct(&o).unwrap();
    assert!(log.is_empty());
    assert!(tailer.snapshots().contains(guard.handle()));
}

#[test]
fn persist_new_publishes_full_attributes_once() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();

    tailer.on_persist(guard.handle(), &o, true).unwrap();

    assert_eq!(
        log.events(),
        vec![ChangeEvent::created(
            "Order",
            json!(1),
            snap(json!({"status": "new", "total": 10}))
        )]
    );
}

#[test]
fn create_with_null_id_is_published() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new"}));
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();
    assert_eq!(log.events()[0].payload.id, Value::Null);
}

#[test]
fn create_only_publishes_whitelisted_fields() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new", "total": 10, "password": "hunter2"}));
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();
    assert_eq!(log.events()[0].payload.get("password"), None);
}

#[test]
fn create_data_serializes_in_schema_order() {
    let tailer = Tailer::new();
    tailer.register(EntitySchema::with_fields("Order", ["total", "status"]));
    let log = std::sync::Arc::new(subtp_core::EventLog::new());
    tailer.add_subscriber(log.clone());

    let o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();

    assert_eq!(
        log.events()[0].to_json().unwrap(),
        r#"{"entity_type":"Order","event":"create","payload":{"id":1,"data":{"total":10,"status":"new"}}}"#
    );
}

// ── Update ───────────────────────────────────────────────────────

#[test]
fn update_publishes_only_changed_fields() {
    let (tailer, log) = order_tailer();
    let mut o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();

    o.set("status", "paid");
    tailer.on_persist(guard.handle(), &o, false).unwrap();

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        ChangeEvent::updated("Order", json!(1), snap(json!({"status": "paid"})))
    );
}

#[test]
fn update_without_changes_has_no_data() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();
    tailer.on_persist(guard.handle(), &o, false).unwrap();

    let events = log.events();
    assert_eq!(events[1].event, EventKind::Update);
    assert_eq!(events[1].payload.data, None);
}

#[test]
fn update_diffs_against_latest_persist_not_construction() {
    let (tailer, log) = order_tailer();
    let mut o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_persist(guard.handle(), &o, true).unwrap();

    o.set("status", "paid");
    tailer.on_persist(guard.handle(), &o, false).unwrap();
    o.set("total", 12);
    tailer.on_persist(guard.handle(), &o, false).unwrap();

    let last = log.events().pop().unwrap();
    assert_eq!(last.payload.data, Some(snap(json!({"total": 12}))));
}

#[test]
fn update_of_loaded_instance_diffs_against_construction() {
    // An instance loaded from storage is constructed, then saved without
    // ever having been created in this process.
    let (tailer, log) = order_tailer();
    let mut o = order(json!({"status": "new", "total": 10})).with_id(7);
    let guard = tailer.on_construct(&o).unwrap();

    o.set("total", 11);
    tailer.on_persist(guard.handle(), &o, false).unwrap();

    assert_eq!(
        log.events(),
        vec![ChangeEvent::updated("Order", json!(7), snap(json!({"total": 11})))]
    );
}

#[test]
fn update_without_construct_is_fatal() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new"})).with_id(1);
    let handle = InstanceHandle::from_raw(404);

    let err = tailer.on_persist(handle, &o, false).unwrap_err();

    assert!(matches!(err, TailError::MissingSnapshot { handle: h, .. } if h == handle));
    assert!(log.is_empty());
}

#[test]
fn update_after_guard_dropped_is_fatal() {
    let (tailer, _log) = order_tailer();
    let o = order(json!({"status": "new"})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    let handle = guard.handle();
    drop(guard);

    assert!(matches!(
        tailer.on_persist(handle, &o, false),
        Err(TailError::MissingSnapshot { .. })
    ));
}

#[test]
fn update_of_instance_with_empty_snapshot_is_allowed() {
    let (tailer, log) = order_tailer();
    let mut o = order(json!({})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();

    o.set("status", "new");
    tailer.on_persist(guard.handle(), &o, false).unwrap();

    assert_eq!(log.events()[0].payload.data, Some(snap(json!({"status": "new"}))));
}

#[test]
fn create_on_released_handle_stores_no_snapshot() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new", "total": 10})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    let stale = guard.handle();
    drop(guard);
    assert!(tailer.snapshots().is_empty());

    tailer.on_persist(stale, &o, true).unwrap();
    tailer
        .on_persist(InstanceHandle::from_raw(999), &o, true)
        .unwrap();

    assert_eq!(log.len(), 2);
    assert_eq!(tailer.snapshots().len(), 0);
}

#[test]
fn update_on_released_handle_after_create_is_fatal() {
    let (tailer, _log) = order_tailer();
    let o = order(json!({"status": "new"})).with_id(1);
    let handle = tailer.on_construct(&o).unwrap().handle();

    tailer.on_persist(handle, &o, true).unwrap();
    assert!(matches!(
        tailer.on_persist(handle, &o, false),
        Err(TailError::MissingSnapshot { .. })
    ));
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn delete_publishes_without_data() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "paid", "total": 10})).with_id(1);
    let _guard = tailer.on_construct(&o).unwrap();

    tailer.on_delete(&o).unwrap();

    assert_eq!(log.events(), vec![ChangeEvent::deleted("Order", json!(1))]);
}

#[test]
fn delete_without_construct_still_publishes() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "paid"})).with_id(3);
    tailer.on_delete(&o).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.events()[0].event, EventKind::Delete);
}

#[test]
fn delete_leaves_snapshot_to_guard() {
    let (tailer, _log) = order_tailer();
    let o = order(json!({"status": "paid"})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();
    tailer.on_delete(&o).unwrap();
    assert!(tailer.snapshots().contains(guard.handle()));
    drop(guard);
    assert!(tailer.snapshots().is_empty());
}

// ── Full scenario ────────────────────────────────────────────────

#[test]
fn order_lifecycle_end_to_end() {
    let (tailer, log) = order_tailer();
    let mut o = order(json!({"status": "new", "total": 10}));
    let guard = tailer.on_construct(&o).unwrap();

    o.id = json!(42);
    tailer.on_persist(guard.handle(), &o, true).unwrap();
    o.set("status", "paid");
    tailer.on_persist(guard.handle(), &o, false).unwrap();
    tailer.on_delete(&o).unwrap();

    let json: Vec<Value> = log
        .events()
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    assert_eq!(
        json,
        vec![
            json!({"entity_type": "Order", "event": "create",
                   "payload": {"id": 42, "data": {"status": "new", "total": 10}}}),
            json!({"entity_type": "Order", "event": "update",
                   "payload": {"id": 42, "data": {"status": "paid"}}}),
            json!({"entity_type": "Order", "event": "delete",
                   "payload": {"id": 42}}),
        ]
    );
}

#[test]
fn instances_are_tracked_independently() {
    let (tailer, log) = order_tailer();
    let mut a = order(json!({"status": "new", "total": 1})).with_id(1);
    let mut b = order(json!({"status": "new", "total": 2})).with_id(2);
    let ga = tailer.on_construct(&a).unwrap();
    let gb = tailer.on_construct(&b).unwrap();
    assert_ne!(ga.handle(), gb.handle());

    a.set("total", 10);
    b.set("status", "void");
    tailer.on_persist(gb.handle(), &b, false).unwrap();
    tailer.on_persist(ga.handle(), &a, false).unwrap();

    let events = log.events();
    assert_eq!(events[0].payload.data, Some(snap(json!({"status": "void"}))));
    assert_eq!(events[1].payload.data, Some(snap(json!({"total": 10}))));
}

// ── Unregistered types ───────────────────────────────────────────

#[test]
fn unregistered_type_is_ignored_by_every_hook() {
    let (tailer, log) = order_tailer();
    let invoice = Entity::new("Invoice", json!({"amount": 5})).with_id(1);

    assert!(tailer.on_construct(&invoice).is_none());
    tailer
        .on_persist(InstanceHandle::from_raw(1), &invoice, false)
        .unwrap();
    tailer
        .on_persist(InstanceHandle::from_raw(1), &invoice, true)
        .unwrap();
    tailer.on_delete(&invoice).unwrap();

    assert!(log.is_empty());
    assert!(tailer.snapshots().is_empty());
}

#[test]
fn unregister_stops_publishing() {
    let (tailer, log) = order_tailer();
    let o = order(json!({"status": "new"})).with_id(1);
    let guard = tailer.on_construct(&o).unwrap();

    assert!(tailer.unregister("Order"));
    tailer.on_persist(guard.handle(), &o, false).unwrap();
    tailer.on_delete(&o).unwrap();
    assert!(log.is_empty());
}

#[test]
fn type_registered_after_construct_fails_on_update() {
    let tailer = Tailer::new();
    let o = order(json!({"status": "new"})).with_id(1);
    assert!(tailer.on_construct(&o).is_none());

    tailer.register(EntitySchema::with_fields("Order", ["status"]));
    let err = tailer
        .on_persist(InstanceHandle::from_raw(1), &o, false)
        .unwrap_err();
    assert!(matches!(err, TailError::MissingSnapshot { .. }));
}
