pub mod identifiers;

pub use identifiers::{DedupKey, LinkDigest};
