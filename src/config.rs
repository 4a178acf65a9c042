use serde::{Deserialize, Serialize};

use crate::normalize::TrackingParams;

pub const DEFAULT_HISTORY_SIZE: usize = 1000;
pub const DEFAULT_DEBOUNCE_HOURS: f64 = 24.0;

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// Maximum number of keys kept per history.
    pub history_size: usize,
    /// Hours during which a seen key is suppressed.
    pub debounce_hours: f64,
    /// Query keys stripped in addition to the built-in tracking set.
    pub extra_tracking_params: Vec<String>,
    /// Emit per-item key diagnostics at debug level.
    pub debug_diagnostics: bool,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            debounce_hours: DEFAULT_DEBOUNCE_HOURS,
            extra_tracking_params: Vec::new(),
            debug_diagnostics: false,
        }
    }
}

impl DedupSettings {
    pub fn debounce_seconds(&self) -> f64 {
        self.debounce_hours * 3600.0
    }

    pub fn tracking_params(&self) -> TrackingParams {
        TrackingParams::default().with_extra(self.extra_tracking_params.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_json_fills_defaults() {
        let settings: DedupSettings = serde_json::from_str(r#"{"debounce_hours": 6}"#).unwrap();
        assert_eq!(settings.history_size, DEFAULT_HISTORY_SIZE);
        assert_eq!(settings.debounce_seconds(), 6.0 * 3600.0);
        assert!(settings.extra_tracking_params.is_empty());
    }

    #[test]
    fn extra_tracking_params_extend_defaults() {
        let settings = DedupSettings {
            extra_tracking_params: vec!["Spm".to_string()],
            ..DedupSettings::default()
        };
        let params = settings.tracking_params();
        assert!(params.contains("spm"));
        assert!(params.contains("utm_source"));
    }
}
