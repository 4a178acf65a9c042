use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::history::store::{HistoryStore, Verdict};
use crate::types::identifiers::DedupKey;

/// Decision for one item within a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Act on the item, then call [`PollCycle::record`].
    Allowed(Verdict),
    /// Inside the debounce window.
    Suppressed(Verdict),
    /// Already recorded earlier in this same cycle.
    SentThisCycle,
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed(_))
    }
}

/// What a cycle changed; persist the store when `has_changes` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub newly_seen: Vec<DedupKey>,
    pub removed_by_cleanup: usize,
    pub history_size: usize,
}

impl CycleSummary {
    pub fn has_changes(&self) -> bool {
        !self.newly_seen.is_empty() || self.removed_by_cleanup > 0
    }
}

/// One pass over a source's current items, evaluated at a single instant.
///
/// Beginning a cycle forgets keys outside the window. Within the cycle a key
/// is admitted at most once, even when several filters match the same item
/// or the source lists it twice.
pub struct PollCycle<'a> {
    store: &'a mut HistoryStore,
    now: f64,
    sent: HashSet<DedupKey>,
    newly_seen: Vec<DedupKey>,
    removed_by_cleanup: usize,
}

impl<'a> PollCycle<'a> {
    pub fn begin(store: &'a mut HistoryStore, now: f64) -> Self {
        let removed_by_cleanup = store.cleanup_old_entries(now);

        Self {
            store,
            now,
            sent: HashSet::new(),
            newly_seen: Vec::new(),
            removed_by_cleanup,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn store(&self) -> &HistoryStore {
        &*self.store
    }

    pub fn admit(&self, key: &DedupKey) -> Admission {
        if self.sent.contains(key) {
            debug!(dedup_key = %key, "already sent this cycle");
            return Admission::SentThisCycle;
        }

        let verdict = self.store.is_duplicate(key, self.now);
        if verdict.is_duplicate() {
            debug!(dedup_key = %key, reason = %verdict, "skipping duplicate");
            Admission::Suppressed(verdict)
        } else {
            Admission::Allowed(verdict)
        }
    }

    /// Mark `key` seen at the cycle's instant.
    pub fn record(&mut self, key: DedupKey) {
        self.store.mark_seen(key.clone(), self.now);
        if self.sent.insert(key.clone()) {
            self.newly_seen.push(key);
        }
    }

    pub fn finish(self) -> CycleSummary {
        let summary = CycleSummary {
            newly_seen: self.newly_seen,
            removed_by_cleanup: self.removed_by_cleanup,
            history_size: self.store.len(),
        };

        if summary.has_changes() {
            info!(
                newly_seen = summary.newly_seen.len(),
                removed = summary.removed_by_cleanup,
                size = summary.history_size,
                "poll cycle finished"
            );
        }
        summary
    }
}
