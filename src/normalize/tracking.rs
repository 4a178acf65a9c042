use std::collections::BTreeSet;

/// Query keys that carry attribution noise rather than identity.
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "mc_cid",
    "mc_eid",
    "_ga",
    "_gac",
    "_gl",
    "_ke",
    "ref",
    "referrer",
    "source",
    "share",
    "share_from",
    "share_id",
];

/// Set of query keys stripped during URL normalization.
///
/// Stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingParams {
    keys: BTreeSet<String>,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self::from_keys(DEFAULT_TRACKING_PARAMS.iter().copied())
    }
}

impl TrackingParams {
    /// A set holding exactly `keys`, without the defaults.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keys: keys.into_iter().map(str::to_lowercase).collect(),
        }
    }

    pub fn with_extra<'a>(mut self, extra: impl IntoIterator<Item = &'a str>) -> Self {
        self.keys.extend(extra.into_iter().map(str::to_lowercase));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
