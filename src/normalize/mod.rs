//! Canonical forms for the two inputs of a dedup key: links and authors.

pub mod author;
pub mod tracking;
pub mod link;

pub use author::{normalize_author, UNKNOWN_AUTHOR};
pub use tracking::{TrackingParams, DEFAULT_TRACKING_PARAMS};
pub use link::{normalize_url, UrlNormalizer};
