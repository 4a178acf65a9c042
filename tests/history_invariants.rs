use feed_dedup::history::{migrate_legacy_keys, HistoryStore, Verdict};
use feed_dedup::DedupKey;
use serde_json::{json, Map, Value};

const HOUR: f64 = 3600.0;
const T0: f64 = 1_700_000_000.0;

fn key(s: &str) -> DedupKey {
    DedupKey::from_raw(s)
}

fn day_store(max_size: usize) -> HistoryStore {
    HistoryStore::new(max_size, 24.0 * HOUR)
}

#[test]
fn invariant_non_finite_mark_is_ignored() {
    let mut store = day_store(100);
    store.mark_seen(key("nan"), f64::NAN);
    assert!(store.is_empty());

    // Consistent with import, which also rejects it.
    let mut imported = day_store(100);
    imported.load_timestamps([("nan", f64::NAN)], T0);
    assert_eq!(store.to_dict(), imported.to_dict());
}

#[test]
fn invariant_unknown_key_is_new() {
    let store = day_store(100);
    assert_eq!(store.is_duplicate(&key("new-key"), T0), Verdict::New);
    assert_eq!(
        store.is_duplicate(&key("new-key"), T0).into_pair(),
        (false, "new".to_string())
    );
}

#[test]
fn invariant_debounce_boundary() {
    let mut store = HistoryStore::new(100, 86_400.0);
    store.mark_seen(key("k"), T0);

    let (dup, reason) = store.is_duplicate(&key("k"), T0 + 3600.0).into_pair();
    assert!(dup);
    assert_eq!(reason, "debounced (1.0h ago)");

    let (dup, reason) = store.is_duplicate(&key("k"), T0 + 90_000.0).into_pair();
    assert!(!dup);
    assert_eq!(reason, "expired (25.0h ago, outside 24h window)");
}

#[test]
fn invariant_expired_key_rearms_and_refreshes() {
    let mut store = day_store(100);
    store.mark_seen(key("k"), T0);

    let later = T0 + 25.0 * HOUR;
    assert!(matches!(
        store.is_duplicate(&key("k"), later),
        Verdict::Expired { .. }
    ));
    assert_eq!(store.len(), 1, "re-arm must not forget the key");

    store.mark_seen(key("k"), later);
    assert!(store.is_duplicate(&key("k"), later + HOUR).is_duplicate());
    assert_eq!(store.last_seen(&key("k")), Some(later));
}

#[test]
fn invariant_trim_keeps_newest() {
    let mut store = day_store(10);
    for i in 0..20 {
        store.mark_seen(key(&format!("key-{i}")), T0 + i as f64);
    }

    assert_eq!(store.size(), 10);
    for i in 10..20 {
        assert!(store.contains(&key(&format!("key-{i}"))), "key-{i} missing");
    }
    for i in 0..10 {
        assert!(!store.contains(&key(&format!("key-{i}"))), "key-{i} kept");
    }
    assert!(store.is_duplicate(&key("key-19"), T0 + 20.0).is_duplicate());
    assert_eq!(store.is_duplicate(&key("key-0"), T0 + 20.0), Verdict::New);
}

#[test]
fn invariant_trim_never_evicts_the_key_just_marked() {
    let mut store = day_store(3);
    for i in 0..3 {
        store.mark_seen(key(&format!("old-{i}")), T0);
    }
    store.mark_seen(key("fresh"), T0 + 1.0);

    assert_eq!(store.len(), 3);
    assert!(store.contains(&key("fresh")));
}

#[test]
fn invariant_overwrite_does_not_grow() {
    let mut store = day_store(10);
    store.mark_seen(key("k"), T0);
    store.mark_seen(key("k"), T0 + 5.0);

    assert_eq!(store.len(), 1);
    assert_eq!(store.last_seen(&key("k")), Some(T0 + 5.0));
}

#[test]
fn invariant_cleanup_removes_only_expired() {
    let mut store = day_store(100);
    store.mark_seen(key("recent"), T0);
    store.mark_seen(key("old"), T0 - 30.0 * HOUR);
    assert_eq!(store.size(), 2);

    let removed = store.cleanup_old_entries(T0);

    assert_eq!(removed, 1);
    assert_eq!(store.size(), 1);
    assert!(store.contains(&key("recent")));
    assert!(!store.contains(&key("old")));
}

#[test]
fn invariant_export_import_roundtrip() {
    let mut first = day_store(100);
    first.mark_seen(key("key1"), T0);
    first.mark_seen(key("key2"), T0 - 1000.0);

    let exported: Map<String, Value> = serde_json::to_value(first.to_dict())
        .unwrap()
        .as_object()
        .cloned()
        .unwrap();

    let mut second = day_store(100);
    assert_eq!(second.load_dict(&exported, T0), 2);
    assert_eq!(second.to_dict(), first.to_dict());
    assert!(second.is_duplicate(&key("key2"), T0).is_duplicate());
}

#[test]
fn invariant_import_filters_by_age() {
    let data = json!({"a": T0, "b": T0 - 30.0 * HOUR});
    let mut store = day_store(100);
    store.load_dict(data.as_object().unwrap(), T0);

    assert_eq!(store.size(), 1);
    assert!(store.contains(&key("a")));
}

#[test]
fn invariant_import_keeps_window_edge() {
    let data = json!({"edge": T0 - 24.0 * HOUR});
    let mut store = day_store(100);
    store.load_dict(data.as_object().unwrap(), T0);
    assert!(store.contains(&key("edge")));
}

#[test]
fn invariant_import_trims_to_capacity() {
    let mut data = Map::new();
    for i in 0..50 {
        data.insert(format!("k{i:02}"), json!(T0 - i as f64));
    }

    let mut store = day_store(5);
    assert_eq!(store.load_dict(&data, T0), 5);
    let kept: Vec<String> = store.to_dict().into_keys().map(DedupKey::into_string).collect();
    assert_eq!(kept, vec!["k00", "k01", "k02", "k03", "k04"]);
}

#[test]
fn invariant_import_skips_malformed_entries() {
    let data = json!({
        "good": T0,
        "text": "yesterday",
        "missing": null,
        "nested": {"ts": T0},
    });
    let mut store = day_store(100);
    assert_eq!(store.load_dict(data.as_object().unwrap(), T0), 1);
}

#[test]
fn invariant_legacy_migration_is_not_expired() {
    let legacy = vec![json!("id:a:author:x"), json!("link:0123456789abcdef:author:y")];
    let migrated = migrate_legacy_keys(&legacy, T0);

    let mut store = day_store(100);
    store.load_timestamps(migrated, T0);

    assert_eq!(store.len(), 2);
    for raw in ["id:a:author:x", "link:0123456789abcdef:author:y"] {
        assert!(store.is_duplicate(&key(raw), T0 + HOUR).is_duplicate());
    }
}

#[test]
fn golden_scenario_post_123() {
    use feed_dedup::{generate_dedup_key, StreamItem};

    let item = StreamItem::new().with_id("post-123").with_author("Jane");
    let (key, _) = generate_dedup_key(&item, true);
    let key = key.unwrap();
    assert_eq!(key.as_str(), "id:post-123:author:jane");

    let mut store = day_store(1000);
    assert_eq!(store.is_duplicate(&key, T0).into_pair(), (false, "new".to_string()));

    store.mark_seen(key.clone(), T0);
    let (dup, reason) = store.is_duplicate(&key, T0).into_pair();
    assert!(dup);
    assert!(reason.starts_with("debounced"), "{reason}");
}
