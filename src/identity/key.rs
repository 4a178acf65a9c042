use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DedupSettings;
use crate::identity::extractor::extract_identifier;
use crate::item::StreamItem;
use crate::normalize::{normalize_author, UrlNormalizer};
use crate::types::identifiers::{DedupKey, LinkDigest};

static WITH_LINK_FALLBACK: LazyLock<KeyGenerator> = LazyLock::new(KeyGenerator::default);
static IDENTIFIER_ONLY: LazyLock<KeyGenerator> =
    LazyLock::new(|| KeyGenerator::default().fallback_to_link(false));

/// Derive the dedup key of `item` with the default normalizer and digester.
///
/// Returns `None` (never an error) when the item has no identifier and
/// either has no usable link or `fallback_to_link` is off.
pub fn generate_dedup_key(
    item: &StreamItem,
    fallback_to_link: bool,
) -> (Option<DedupKey>, KeyDiagnostics) {
    if fallback_to_link {
        WITH_LINK_FALLBACK.generate(item)
    } else {
        IDENTIFIER_ONLY.generate(item)
    }
}

/// Which branch produced the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    EntryId,
    Link,
    None,
}

/// Explanation of how a key was derived. Observability only; nothing in the
/// crate reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDiagnostics {
    pub author_raw: String,
    pub author_normalized: String,
    pub key_type: KeyType,
    pub entry_id: Option<String>,
    pub link_raw: Option<String>,
    pub link_normalized: Option<String>,
    pub dedup_key: Option<String>,
}

impl KeyDiagnostics {
    fn new(author_raw: &str, author_normalized: &str) -> Self {
        Self {
            author_raw: author_raw.to_string(),
            author_normalized: author_normalized.to_string(),
            key_type: KeyType::None,
            entry_id: None,
            link_raw: None,
            link_normalized: None,
            dedup_key: None,
        }
    }
}

pub trait LinkDigester {
    /// Fixed-length, deterministic digest of an already normalized link.
    fn digest(&self, normalized_link: &str) -> LinkDigest;
}

/// v0: truncated SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl LinkDigester for Sha256Digester {
    fn digest(&self, normalized_link: &str) -> LinkDigest {
        LinkDigest::sha256(normalized_link)
    }
}

pub struct KeyGenerator<D = Sha256Digester> {
    normalizer: UrlNormalizer,
    digester: D,
    fallback_to_link: bool,
    verbose: bool,
}

impl Default for KeyGenerator<Sha256Digester> {
    fn default() -> Self {
        Self::new(UrlNormalizer::default(), Sha256Digester)
    }
}

impl KeyGenerator<Sha256Digester> {
    /// Generator honouring configured extra tracking parameters and the
    /// diagnostics flag.
    pub fn from_settings(settings: &DedupSettings) -> Self {
        let mut generator = Self::new(UrlNormalizer::new(settings.tracking_params()), Sha256Digester);
        generator.verbose = settings.debug_diagnostics;
        generator
    }
}

impl<D> KeyGenerator<D>
where
    D: LinkDigester,
{
    pub fn new(normalizer: UrlNormalizer, digester: D) -> Self {
        Self {
            normalizer,
            digester,
            fallback_to_link: true,
            verbose: false,
        }
    }

    pub fn fallback_to_link(mut self, enabled: bool) -> Self {
        self.fallback_to_link = enabled;
        self
    }

    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    pub fn generate(&self, item: &StreamItem) -> (Option<DedupKey>, KeyDiagnostics) {
        // 1. Author is part of every key shape
        let author_raw = item.author_source().unwrap_or_default();
        let author_normalized = normalize_author(author_raw);
        let mut diagnostics = KeyDiagnostics::new(author_raw, &author_normalized);

        // 2. Identifier, then link, then nothing
        let key = if let Some(identifier) = extract_identifier(item) {
            let key = DedupKey::from_identifier(&identifier, &author_normalized);
            diagnostics.key_type = KeyType::EntryId;
            diagnostics.entry_id = Some(identifier);
            Some(key)
        } else if let Some(link) = item.usable_link().filter(|_| self.fallback_to_link) {
            let normalized = self.normalizer.normalize(link);
            let digest = self.digester.digest(&normalized);
            diagnostics.key_type = KeyType::Link;
            diagnostics.link_raw = Some(link.to_string());
            diagnostics.link_normalized = Some(normalized);
            Some(DedupKey::from_link(&digest, &author_normalized))
        } else {
            None
        };

        diagnostics.dedup_key = key.as_ref().map(|k| k.as_str().to_string());

        if self.verbose {
            debug!(
                title = item.title.as_deref().unwrap_or_default(),
                key_type = ?diagnostics.key_type,
                author = %diagnostics.author_raw,
                link_normalized = diagnostics.link_normalized.as_deref().unwrap_or_default(),
                dedup_key = diagnostics.dedup_key.as_deref().unwrap_or_default(),
                "derived dedup key"
            );
        } else {
            trace!(key_type = ?diagnostics.key_type, dedup_key = ?diagnostics.dedup_key);
        }

        (key, diagnostics)
    }
}
