use gemini_change_mode::{CacheBackend, ChangeModeConfig, ChunkBudget};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CACHE_BACKEND: &str = "GEMINI_MCP_CACHE_BACKEND";
pub const ENV_CACHE_DIR: &str = "GEMINI_MCP_CACHE_DIR";
pub const ENV_CACHE_TTL_SECS: &str = "GEMINI_MCP_CACHE_TTL_SECS";
pub const ENV_CACHE_LIMIT: &str = "GEMINI_MCP_CACHE_LIMIT";
pub const ENV_CHUNK_MAX_CHARS: &str = "GEMINI_MCP_CHUNK_MAX_CHARS";
pub const ENV_CHUNK_MAX_EDITS: &str = "GEMINI_MCP_CHUNK_MAX_EDITS";
pub const ENV_TIMEOUT_SECS: &str = "GEMINI_MCP_TIMEOUT_SECS";
pub const ENV_CLI_BIN: &str = "GEMINI_CLI_BIN";

/// Process-wide server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub change_mode: ChangeModeConfig,
    pub backend_timeout: Duration,
    /// Explicit `gemini` executable; `None` searches `PATH`
    pub cli_bin: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            change_mode: ChangeModeConfig::default(),
            backend_timeout: gemini_backend::DEFAULT_TIMEOUT,
            cli_bin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Bad values are logged and replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();
        let store = &mut config.change_mode.store;

        if let Some(raw) = var(ENV_CACHE_BACKEND) {
            match CacheBackend::parse(&raw) {
                Some(backend) => store.backend = backend,
                None => log::warn!("Unknown {ENV_CACHE_BACKEND} '{raw}', using file backend"),
            }
        }
        if let Some(dir) = var(ENV_CACHE_DIR) {
            store.dir = PathBuf::from(dir);
        }
        if let Some(secs) = positive(ENV_CACHE_TTL_SECS, var(ENV_CACHE_TTL_SECS)) {
            store.ttl = Duration::from_secs(secs);
        }
        if let Some(limit) = positive(ENV_CACHE_LIMIT, var(ENV_CACHE_LIMIT)) {
            store.capacity = to_usize(limit);
        }

        let max_chars = positive(ENV_CHUNK_MAX_CHARS, var(ENV_CHUNK_MAX_CHARS));
        let max_edits = positive(ENV_CHUNK_MAX_EDITS, var(ENV_CHUNK_MAX_EDITS));
        config.change_mode.budget = match (max_edits, max_chars) {
            (Some(edits), _) => ChunkBudget::MaxEdits(to_usize(edits)),
            (None, Some(chars)) => ChunkBudget::MaxChars(to_usize(chars)),
            (None, None) => ChunkBudget::default(),
        };

        if let Some(secs) = positive(ENV_TIMEOUT_SECS, var(ENV_TIMEOUT_SECS)) {
            config.backend_timeout = Duration::from_secs(secs);
        }
        config.cli_bin = var(ENV_CLI_BIN).map(PathBuf::from);
        config
    }
}

fn positive(name: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            log::warn!("Ignoring {name}='{raw}': expected a positive integer");
            None
        }
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ServerConfig::default());
        assert!(config.change_mode.validate().is_ok());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            (ENV_CACHE_BACKEND, " memory "),
            (ENV_CACHE_TTL_SECS, "60"),
            (ENV_CACHE_LIMIT, "3"),
            (ENV_CHUNK_MAX_CHARS, "900"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_CLI_BIN, "/opt/gemini"),
        ]);
        let store = &config.change_mode.store;
        assert_eq!(store.backend, CacheBackend::Memory);
        assert_eq!(store.ttl, Duration::from_secs(60));
        assert_eq!(store.capacity, 3);
        assert_eq!(config.change_mode.budget, ChunkBudget::MaxChars(900));
        assert_eq!(config.backend_timeout, Duration::from_secs(5));
        assert_eq!(config.cli_bin, Some(PathBuf::from("/opt/gemini")));
    }

    #[test]
    fn edit_count_budget_wins_over_char_budget() {
        let config = config_from(&[(ENV_CHUNK_MAX_CHARS, "900"), (ENV_CHUNK_MAX_EDITS, "4")]);
        assert_eq!(config.change_mode.budget, ChunkBudget::MaxEdits(4));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            (ENV_CACHE_BACKEND, "redis"),
            (ENV_CACHE_TTL_SECS, "0"),
            (ENV_CACHE_LIMIT, "-1"),
            (ENV_CHUNK_MAX_EDITS, "many"),
            (ENV_CLI_BIN, "   "),
        ]);
        assert_eq!(config, ServerConfig::default());
    }
}
