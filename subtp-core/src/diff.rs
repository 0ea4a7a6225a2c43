//! Attribute-level delta between two snapshots.

use subtp_types::Snapshot;

/// Returns the attributes of `current` whose values differ from `previous`.
///
/// Only keys present in `current` are considered. A key missing from
/// `previous` counts as changed. The result is empty when nothing changed.
pub fn diff(current: &Snapshot, previous: &Snapshot) -> Snapshot {
    current
        .iter()
        .filter(|(key, value)| previous.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Returns true if `diff(current, previous)` would be non-empty.
pub fn has_changes(current: &Snapshot, previous: &Snapshot) -> bool {
    current
        .iter()
        .any(|(key, value)| previous.get(key.as_str()) != Some(value))
}
