use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default size budget per chunk, in estimated rendered characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 20_000;

/// Default time-to-live of a cached chunk group
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default maximum number of cached chunk groups
pub const DEFAULT_CACHE_LIMIT: usize = 50;

/// Directory name used under the system temp dir for the file backend
pub const CACHE_DIR_NAME: &str = "gemini-mcp-chunks";

/// Capacity of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkBudget {
    /// Estimated rendered size per chunk (soft limit: one oversized edit still gets a chunk)
    MaxChars(usize),

    /// Fixed number of edits per chunk; the last chunk may be shorter
    MaxEdits(usize),
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self::MaxChars(DEFAULT_MAX_CHUNK_CHARS)
    }
}

impl ChunkBudget {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::MaxChars(0) => Err("max_chars must be > 0".to_string()),
            Self::MaxEdits(0) => Err("max_edits must be > 0".to_string()),
            _ => Ok(()),
        }
    }
}

/// Where cached chunk groups live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// One JSON record per key under [`StoreConfig::dir`]
    File,
    /// Process memory only
    Memory,
}

impl CacheBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" | "fs" | "disk" => Some(Self::File),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Chunk store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: CacheBackend,
    pub dir: PathBuf,
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::File,
            dir: std::env::temp_dir().join(CACHE_DIR_NAME),
            ttl: DEFAULT_CACHE_TTL,
            capacity: DEFAULT_CACHE_LIMIT,
        }
    }
}

impl StoreConfig {
    /// In-memory store with default limits
    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ..Default::default()
        }
    }

    /// File-backed store rooted at `dir`
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: CacheBackend::File,
            dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be > 0".to_string());
        }
        if self.ttl.is_zero() {
            return Err("ttl must be > 0".to_string());
        }
        if self.backend == CacheBackend::File && self.dir.as_os_str().is_empty() {
            return Err("file backend requires a cache dir".to_string());
        }
        Ok(())
    }
}

/// Everything the change-mode pipeline needs to know
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeModeConfig {
    pub budget: ChunkBudget,
    pub store: StoreConfig,
}

impl ChangeModeConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.budget.validate()?;
        self.store.validate()
    }
}
