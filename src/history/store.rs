use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::clock::unix_now;
use crate::config::DedupSettings;
use crate::types::identifiers::DedupKey;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Key never seen (or forgotten).
    New,
    /// Seen inside the debounce window; suppress.
    Debounced { elapsed_seconds: f64 },
    /// Seen, but the window has elapsed. The key stays in history; acting on
    /// it again is allowed and should be followed by `mark_seen`.
    Expired {
        elapsed_seconds: f64,
        window_seconds: f64,
    },
}

impl Verdict {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Verdict::Debounced { .. })
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn into_pair(self) -> (bool, String) {
        (self.is_duplicate(), self.reason())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::New => f.write_str("new"),
            Verdict::Debounced { elapsed_seconds } => {
                write!(f, "debounced ({:.1}h ago)", elapsed_seconds / SECONDS_PER_HOUR)
            }
            Verdict::Expired {
                elapsed_seconds,
                window_seconds,
            } => write!(
                f,
                "expired ({:.1}h ago, outside {:.0}h window)",
                elapsed_seconds / SECONDS_PER_HOUR,
                window_seconds / SECONDS_PER_HOUR
            ),
        }
    }
}

/// Bounded, time-aware map from dedup key to last-seen Unix timestamp.
///
/// `max_size` and `debounce_seconds` are fixed at construction. The store
/// does no locking: mutation takes `&mut self`, and callers that share one
/// instance across threads must wrap it themselves. The intended layout is
/// one store per source, owned by the worker polling that source.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    records: HashMap<DedupKey, f64>,
    max_size: usize,
    debounce_seconds: f64,
}

impl HistoryStore {
    pub fn new(max_size: usize, debounce_seconds: f64) -> Self {
        Self {
            records: HashMap::new(),
            max_size,
            debounce_seconds,
        }
    }

    pub fn with_debounce_hours(max_size: usize, debounce_hours: f64) -> Self {
        Self::new(max_size, debounce_hours * SECONDS_PER_HOUR)
    }

    pub fn from_settings(settings: &DedupSettings) -> Self {
        Self::new(settings.history_size, settings.debounce_seconds())
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn debounce_seconds(&self) -> f64 {
        self.debounce_seconds
    }

    pub fn is_duplicate(&self, key: &DedupKey, now: f64) -> Verdict {
        let Some(&last_seen) = self.records.get(key) else {
            return Verdict::New;
        };

        let elapsed_seconds = now - last_seen;
        if elapsed_seconds < self.debounce_seconds {
            Verdict::Debounced { elapsed_seconds }
        } else {
            Verdict::Expired {
                elapsed_seconds,
                window_seconds: self.debounce_seconds,
            }
        }
    }

    pub fn is_duplicate_now(&self, key: &DedupKey) -> Verdict {
        self.is_duplicate(key, unix_now())
    }

    /// Record `key` as seen at `now`, overwriting any earlier timestamp,
    /// then enforce `max_size`. A non-finite `now` is ignored, as on import.
    pub fn mark_seen(&mut self, key: DedupKey, now: f64) {
        if !now.is_finite() {
            warn!(dedup_key = %key, now, "ignoring non-finite timestamp");
            return;
        }
        self.records.insert(key, now);
        self.trim();
    }

    pub fn mark_seen_now(&mut self, key: DedupKey) {
        self.mark_seen(key, unix_now());
    }

    /// Keep only the `max_size` most recent entries. Ties on timestamp keep
    /// the lexicographically smaller key. Returns the number evicted.
    pub fn trim(&mut self) -> usize {
        if self.records.len() <= self.max_size {
            return 0;
        }

        let mut entries: Vec<(DedupKey, f64)> = self.records.drain().collect();
        let evicted = entries.len() - self.max_size;

        entries.select_nth_unstable_by(self.max_size, newest_first);
        entries.truncate(self.max_size);
        self.records = entries.into_iter().collect();

        debug!(evicted, size = self.records.len(), "trimmed dedup history");
        evicted
    }

    /// Forget every key whose window has elapsed at `now`. Returns the number
    /// removed.
    pub fn cleanup_old_entries(&mut self, now: f64) -> usize {
        let before = self.records.len();
        let window = self.debounce_seconds;

        self.records.retain(|_, last_seen| now - *last_seen < window);

        let removed = before - self.records.len();
        if removed > 0 {
            debug!(removed, size = self.records.len(), "cleaned up old dedup entries");
        }
        removed
    }

    pub fn cleanup_old_entries_now(&mut self) -> usize {
        self.cleanup_old_entries(unix_now())
    }

    /// Owned snapshot of the records, ordered by key.
    pub fn to_dict(&self) -> BTreeMap<DedupKey, f64> {
        self.records
            .iter()
            .map(|(key, seen)| (key.clone(), *seen))
            .collect()
    }

    /// Replace all records with the entries of a persisted JSON object.
    ///
    /// Entries whose value is not a finite number, or that are already
    /// outside the window at `now`, are dropped. Returns the number loaded.
    pub fn load_dict(&mut self, data: &Map<String, Value>, now: f64) -> usize {
        let timestamps = data
            .iter()
            .filter_map(|(key, value)| value.as_f64().map(|seen| (key.as_str(), seen)));

        self.load_timestamps(timestamps, now)
    }

    pub fn load_dict_now(&mut self, data: &Map<String, Value>) -> usize {
        self.load_dict(data, unix_now())
    }

    /// Typed variant of [`HistoryStore::load_dict`].
    pub fn load_timestamps<K, I>(&mut self, entries: I, now: f64) -> usize
    where
        K: Into<DedupKey>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let cutoff = now - self.debounce_seconds;

        self.records = entries
            .into_iter()
            .filter(|(_, seen)| seen.is_finite() && *seen >= cutoff)
            .map(|(key, seen)| (key.into(), seen))
            .collect();

        self.trim();
        info!(size = self.records.len(), "loaded dedup history");
        self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn last_seen(&self, key: &DedupKey) -> Option<f64> {
        self.records.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DedupKey> {
        self.records.keys()
    }
}

fn newest_first(a: &(DedupKey, f64), b: &(DedupKey, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
