use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the link digest.
pub const LINK_DIGEST_LEN: usize = 16;

/// Opaque deduplication identity of a stream item.
///
/// Built only from an entry identifier or a link digest, always paired with
/// a normalized author. Keys read back from persisted history are accepted
/// verbatim through [`DedupKey::from_raw`]; the engine never parses a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// `id:<identifier>:author:<normalized-author>`
    pub fn from_identifier(identifier: &str, normalized_author: &str) -> Self {
        DedupKey(format!("id:{identifier}:author:{normalized_author}"))
    }

    /// `link:<digest>:author:<normalized-author>`
    pub fn from_link(digest: &LinkDigest, normalized_author: &str) -> Self {
        DedupKey(format!("link:{}:author:{normalized_author}", digest.as_str()))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        DedupKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DedupKey {
    fn from(raw: &str) -> Self {
        DedupKey::from_raw(raw)
    }
}

impl From<String> for DedupKey {
    fn from(raw: String) -> Self {
        DedupKey(raw)
    }
}

/// Truncated content hash of a normalized link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkDigest(String);

impl LinkDigest {
    /// SHA-256 of the normalized link, first 16 lowercase hex characters.
    pub fn sha256(normalized_link: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalized_link.as_bytes());

        let hash = hasher.finalize();
        let mut hex = hex::encode(hash);
        hex.truncate(LINK_DIGEST_LEN);

        LinkDigest(hex)
    }

    /// Wrap an already computed digest.
    ///
    /// Used by custom digesters; the value is trusted as-is.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        LinkDigest(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
