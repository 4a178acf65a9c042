//! Deterministic deduplication engine for feed and stream items.
//!
//! `feed-dedup` derives a stable identity for a stream item (entry id, guid,
//! or a digest of its normalized link, always paired with the normalized
//! author) and decides with a time-windowed debounce policy whether that item
//! has already been acted upon. Identity derivation is deterministic:
//! identical inputs always produce identical keys, byte-for-byte.
//!
//! Nothing in this crate locks. A [`history::HistoryStore`] is mutated through
//! `&mut self`; callers that share one across threads serialize access
//! themselves.

pub mod clock;
pub mod config;
pub mod history;
pub mod identity;
pub mod item;
pub mod normalize;
pub mod types;

pub use config::DedupSettings;
pub use history::{HistoryStore, Verdict};
pub use identity::{generate_dedup_key, KeyDiagnostics, KeyGenerator, KeyType};
pub use item::StreamItem;
pub use types::{DedupKey, LinkDigest};
