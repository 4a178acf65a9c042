use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::types::identifiers::DedupKey;

/// Turn a legacy list of bare keys into timestamped entries, all stamped
/// `now` so none of them reads as expired on import.
///
/// Non-string members and empty strings are skipped.
pub fn migrate_legacy_keys(keys: &[Value], now: f64) -> BTreeMap<DedupKey, f64> {
    let migrated: BTreeMap<DedupKey, f64> = keys
        .iter()
        .filter_map(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(|key| (DedupKey::from_raw(key), now))
        .collect();

    info!(
        listed = keys.len(),
        migrated = migrated.len(),
        "migrating legacy notified key list"
    );
    migrated
}
