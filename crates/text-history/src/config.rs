//! Configuration for the history system.

/// Environment variable that toggles compaction of range queries.
pub const COMPACT_ENV_VAR: &str = "TEXT_HISTORY_COMPACT";

/// Configuration for a [`History`](crate::History).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Whether `get_actions` compacts the selected actions before
    /// returning them.
    pub compact_queries: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            compact_queries: true,
        }
    }
}

impl HistoryConfig {
    /// Builds a config from the environment.
    ///
    /// `TEXT_HISTORY_COMPACT` set to `0`, `false`, `off` or `no`
    /// (any case) disables query compaction. Any other value, or no value,
    /// keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(COMPACT_ENV_VAR) {
            config.compact_queries = !is_disabled(&value);
        }
        config
    }
}

fn is_disabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
