pub mod cycle;
pub mod migration;
pub mod persistence;
pub mod store;

pub use cycle::{Admission, CycleSummary, PollCycle};
pub use migration::migrate_legacy_keys;
pub use persistence::{load_history, save_history, HistoryDocument, PersistenceError};
pub use store::{HistoryStore, Verdict};
