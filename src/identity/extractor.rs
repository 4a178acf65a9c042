use tracing::debug;

use crate::item::StreamItem;

/// Most stable identifier the item offers: `id`, then `guid`.
///
/// Values are trimmed; blank values are skipped. `None` means the caller
/// must fall back to link identity.
pub fn extract_identifier(item: &StreamItem) -> Option<String> {
    if let Some(id) = non_blank(item.id.as_deref()) {
        debug!(entry_id = id, "using entry id");
        return Some(id.to_string());
    }

    if let Some(guid) = non_blank(item.guid.as_deref()) {
        debug!(guid, "using entry guid");
        return Some(guid.to_string());
    }

    None
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
