use std::sync::LazyLock;

use tracing::{debug, warn};
use url::{form_urlencoded, ParseError, Url};

use super::tracking::TrackingParams;

static DEFAULT_NORMALIZER: LazyLock<UrlNormalizer> = LazyLock::new(UrlNormalizer::default);

/// Normalize `url` with the default tracking-parameter set.
pub fn normalize_url(url: &str) -> String {
    DEFAULT_NORMALIZER.normalize(url)
}

/// Canonicalizes links so that superficially different URLs of the same
/// resource compare equal.
///
/// Rules:
/// - scheme and host lowercased, user info kept
/// - tracking query keys removed (case-insensitive)
/// - remaining query pairs sorted by key, re-encoded form-urlencoded
/// - fragment dropped
/// - trailing slashes stripped from the path
///
/// Scheme-less references (`/t/42?x=1`, `//host/p`, `example.com/Path`)
/// follow the same rules; their path case is kept. Input that fails to parse
/// for any other reason is returned trimmed and lowercased. The operation is
/// idempotent.
#[derive(Debug, Clone, Default)]
pub struct UrlNormalizer {
    tracking: TrackingParams,
}

impl UrlNormalizer {
    pub fn new(tracking: TrackingParams) -> Self {
        Self { tracking }
    }

    pub fn tracking_params(&self) -> &TrackingParams {
        &self.tracking
    }

    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        match Url::parse(trimmed) {
            Ok(parsed) => self.rebuild(&parsed),
            Err(ParseError::RelativeUrlWithoutBase) => {
                debug!(url = trimmed, "relative link");
                self.rebuild_relative(trimmed)
            }
            Err(err) => {
                warn!(url = trimmed, error = %err, "URL normalization failed");
                self.fallback(trimmed)
            }
        }
    }

    // A lowercased fallback that happens to parse is rebuilt, so a second
    // pass cannot change it.
    fn fallback(&self, trimmed: &str) -> String {
        let lowered = trimmed.to_lowercase();
        match Url::parse(&lowered) {
            Ok(parsed) => self.rebuild(&parsed),
            Err(_) => lowered,
        }
    }

    fn rebuild(&self, parsed: &Url) -> String {
        let mut out = String::with_capacity(parsed.as_str().len());

        out.push_str(parsed.scheme());
        out.push(':');
        if has_authority(parsed) {
            out.push_str("//");
            push_authority(&mut out, parsed);
        }

        // Opaque paths may keep literal spaces; they must not end the output.
        out.push_str(parsed.path().trim_end_matches(|c: char| c == '/' || c.is_whitespace()));

        self.push_query(&mut out, parsed.query_pairs());
        out
    }

    fn rebuild_relative(&self, trimmed: &str) -> String {
        let reference = trimmed.split_once('#').map_or(trimmed, |(head, _)| head);
        let (head, query) = match reference.split_once('?') {
            Some((head, query)) => (head, query),
            None => (reference, ""),
        };

        let mut out = String::with_capacity(reference.len());
        let path = match head.strip_prefix("//") {
            Some(rest) => {
                let (authority, path) = rest.find('/').map_or((rest, ""), |i| rest.split_at(i));
                out.push_str("//");
                out.push_str(&authority.to_lowercase());
                path
            }
            None => head,
        };

        out.push_str(path);
        // With an empty path the authority itself may end in whitespace.
        let kept = out.trim_end_matches(|c: char| c == '/' || c.is_whitespace()).len();
        out.truncate(kept);

        self.push_query(&mut out, form_urlencoded::parse(query.as_bytes()));
        out
    }

    fn push_query(&self, out: &mut String, pairs: form_urlencoded::Parse<'_>) {
        let query = self.filtered_query(pairs);
        if !query.is_empty() {
            out.push('?');
            out.push_str(&query);
        }
    }

    fn filtered_query(&self, pairs: form_urlencoded::Parse<'_>) -> String {
        let mut pairs: Vec<(String, String)> = pairs
            .filter(|(key, _)| !self.tracking.contains(key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        // Stable: repeated keys keep their relative order.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

// `file:///x` has no host but still serializes an empty authority.
fn has_authority(parsed: &Url) -> bool {
    parsed.as_str()[parsed.scheme().len() + 1..].starts_with("//")
}

fn push_authority(out: &mut String, parsed: &Url) {
    let username = parsed.username();
    let password = parsed.password();

    // Credentials are case-sensitive; only the host is folded.
    if !username.is_empty() || password.is_some() {
        out.push_str(username);
        if let Some(password) = password {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }

    if let Some(host) = parsed.host_str() {
        out.push_str(&host.to_lowercase());
    }

    if let Some(port) = parsed.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
}
