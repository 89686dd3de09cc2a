use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::models::{ModificationHistory, OperationType};

/// One field that differs between the before and after snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    /// `None` when the field did not exist before.
    pub old: Option<Value>,
    /// `None` when the field no longer exists.
    pub new: Option<Value>,
}

fn parse_snapshot(raw: Option<&str>) -> Option<Map<String, Value>> {
    match serde_json::from_str(raw?) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Field-level diff of an UPDATE entry. Keys of both snapshots are unioned
/// (old order first) and every key whose value differs is reported. Other
/// operations and unreadable snapshots give an empty diff.
pub fn diff(entry: &ModificationHistory) -> Vec<FieldChange> {
    if entry.operation_type != OperationType::Update {
        return Vec::new();
    }
    let (Some(old), Some(new)) = (
        parse_snapshot(entry.old_data.as_deref()),
        parse_snapshot(entry.new_data.as_deref()),
    ) else {
        return Vec::new();
    };

    let keys = old
        .keys()
        .chain(new.keys().filter(|k| !old.contains_key(*k)));

    keys.filter_map(|key| {
        let before = old.get(key);
        let after = new.get(key);
        (before != after).then(|| FieldChange {
            field: key.clone(),
            old: before.cloned(),
            new: after.cloned(),
        })
    })
    .collect()
}

/// Indented snapshot for display, the raw text if it is not JSON.
pub fn pretty_snapshot(raw: Option<&str>) -> String {
    match raw {
        None => "(empty)".to_string(),
        Some(s) if s.trim().is_empty() => "(empty)".to_string(),
        Some(s) => serde_json::from_str::<Value>(s)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| s.to_string()),
    }
}

pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "(empty)".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Backend timestamps are local ISO-8601 without offset; some carry an
/// offset or fractional seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Oldest first; unparsable timestamps go last, ties by id.
pub fn sort_by_time(entries: &mut [ModificationHistory]) {
    entries.sort_by_cached_key(|e| {
        let time = parse_timestamp(&e.timestamp);
        (time.is_none(), time, e.id)
    });
}

/// `2024-05-01 10:00:00`, or the raw text when it does not parse.
pub fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}
