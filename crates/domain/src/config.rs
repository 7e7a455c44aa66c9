//! Configuration loaded from environment variables.

/// Core configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `IAM_EDITOR_SERVICE`: service name stamped on every event (default: `"iam-core"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub editor_service: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            editor_service: lookup("IAM_EDITOR_SERVICE")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.editor_service),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor_service: "iam-core".to_string(),
            log_level: "info".to_string(),
        }
    }
}
