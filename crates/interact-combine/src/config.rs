//! Combine Configuration - failure handling for combined reducers

use serde::{Deserialize, Serialize};

/// Configuration for a [`CombinedReducer`](crate::CombinedReducer)
///
/// # Example
///
/// ```
/// use interact_combine::CombineConfig;
///
/// let config = CombineConfig::from_ron("(isolate_panics: false)").unwrap();
/// assert!(!config.isolate_panics);
/// assert!(config.log_failures);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Catch panics raised by a unit and treat them like errors
    ///
    /// When disabled, a panicking unit unwinds through `dispatch`.
    pub isolate_panics: bool,

    /// Emit a `tracing` error event for every unit failure
    pub log_failures: bool,
}

impl CombineConfig {
    /// Parse a configuration from RON text; missing fields take their defaults
    pub fn from_ron(text: &str) -> crate::Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            isolate_panics: true,
            log_failures: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CombineConfig::default();
        assert!(config.isolate_panics);
        assert!(config.log_failures);
        assert_eq!(CombineConfig::from_ron("()").unwrap(), config);
    }

    #[test]
    fn test_from_ron() {
        let config =
            CombineConfig::from_ron("(isolate_panics: false, log_failures: false)").unwrap();
        assert!(!config.isolate_panics);
        assert!(!config.log_failures);
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        assert!(matches!(
            CombineConfig::from_ron("(isolate_panics: maybe)"),
            Err(crate::Error::Config(_))
        ));
    }
}
