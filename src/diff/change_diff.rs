use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat view of a record's fields, already lifted out of storage types
pub type FieldMap = BTreeMap<String, Value>;

/// Minimal per-field change set; only fields that actually differ appear
pub type ChangeSet = BTreeMap<String, FieldChange>;

/// Old and new value of one field. CREATE leaves `old` null, DELETE leaves
/// `new` null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Fields managed by the storage layer, excluded from CREATE/DELETE diffs
const SYSTEM_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// The modification timestamp always changes and carries no information
const MODIFIED_FIELD: &str = "updated_at";

/// Diff for a freshly created record: every non-system field, old side null.
pub fn diff_for_create(new_fields: &FieldMap) -> ChangeSet {
    new_fields
        .iter()
        .filter(|(name, _)| !is_system_field(name))
        .map(|(name, value)| {
            (
                name.clone(),
                FieldChange {
                    old: Value::Null,
                    new: normalize(value),
                },
            )
        })
        .collect()
}

/// Diff for an update: exactly the fields whose values differ.
///
/// Returns an empty map for identical inputs; callers must treat that as
/// "nothing to record".
pub fn diff_for_update(old_fields: &FieldMap, new_fields: &FieldMap) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (name, old_value) in old_fields {
        if name == MODIFIED_FIELD {
            continue;
        }
        let new_value = new_fields.get(name).unwrap_or(&Value::Null);
        if !values_equal(old_value, new_value) {
            changes.insert(
                name.clone(),
                FieldChange {
                    old: normalize(old_value),
                    new: normalize(new_value),
                },
            );
        }
    }

    // Fields present only on the new side
    for (name, new_value) in new_fields {
        if name == MODIFIED_FIELD || old_fields.contains_key(name) {
            continue;
        }
        if !values_equal(&Value::Null, new_value) {
            changes.insert(
                name.clone(),
                FieldChange {
                    old: Value::Null,
                    new: normalize(new_value),
                },
            );
        }
    }

    changes
}

/// Diff for a deleted record: every non-system field, new side null.
pub fn diff_for_delete(old_fields: &FieldMap) -> ChangeSet {
    old_fields
        .iter()
        .filter(|(name, _)| !is_system_field(name))
        .map(|(name, value)| {
            (
                name.clone(),
                FieldChange {
                    old: normalize(value),
                    new: Value::Null,
                },
            )
        })
        .collect()
}

fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

/// Equality policy: null means absent; timestamps compare by instant;
/// structured values compare by deep value equality; everything else by
/// JSON equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_null() && b.is_null() {
        return true;
    }
    if a.is_null() != b.is_null() {
        return false;
    }
    if let (Some(ta), Some(tb)) = (as_timestamp(a), as_timestamp(b)) {
        return ta == tb;
    }
    a == b
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Serialize a value to a stable, storage-independent primitive.
/// Timestamp strings are canonicalized to UTC RFC-3339.
fn normalize(value: &Value) -> Value {
    match as_timestamp(value) {
        Some(ts) => Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
        None => value.clone(),
    }
}
