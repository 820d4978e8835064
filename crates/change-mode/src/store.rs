//! Chunk store: keyed cache of chunk groups with TTL expiry and count-based eviction.
//!
//! Expiry is checked lazily on read and swept on every write. Eviction removes the oldest
//! groups by creation time (reads do not refresh age) until the store is back at capacity.
//! A miss caused by expiry is deliberately indistinguishable from a key that never existed.

use crate::config::{CacheBackend, StoreConfig};
use crate::error::{ChangeModeError, Result};
use crate::key::is_well_formed_key;
use crate::types::{Chunk, ChunkGroup};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const RECORD_VERSION: u32 = 1;
const LOCK_FILE_NAME: &str = ".lock";

/// Source of "now" for expiry decisions
pub trait Clock: Send + Sync {
    fn now_unix_ms(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(unix_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(unix_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Why a chunk could not be served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CacheMiss {
    /// Key unknown, expired, or its record was unreadable
    Absent { key: String },

    /// Key exists but `index` is outside `1..=available`
    IndexOutOfRange { index: usize, available: usize },
}

impl fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent { key } => write!(f, "Cache miss for {key}"),
            Self::IndexOutOfRange { index, available } => {
                write!(f, "Invalid chunk index {index}; available 1..{available}")
            }
        }
    }
}

/// One chunk served from the store, with its position in the group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHit {
    pub chunk: Chunk,
    /// 1-based
    pub index: usize,
    pub total: usize,
}

/// Process-wide chunk cache.
///
/// Construct once and share behind an `Arc`; every operation takes `&self`.
pub struct ChunkStore {
    ttl_ms: u64,
    capacity: usize,
    clock: Arc<dyn Clock>,
    backend: Backend,
}

enum Backend {
    Memory(Mutex<MemCache>),
    File(FileCache),
}

impl fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match &self.backend {
            Backend::Memory(_) => "memory".to_string(),
            Backend::File(files) => files.dir.display().to_string(),
        };
        f.debug_struct("ChunkStore")
            .field("ttl_ms", &self.ttl_ms)
            .field("capacity", &self.capacity)
            .field("backend", &backend)
            .finish()
    }
}

impl ChunkStore {
    /// Create a store reading time from the wall clock
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock
    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate().map_err(ChangeModeError::invalid_config)?;
        let backend = match config.backend {
            CacheBackend::Memory => Backend::Memory(Mutex::new(MemCache::default())),
            CacheBackend::File => {
                std::fs::create_dir_all(&config.dir)?;
                Backend::File(FileCache {
                    dir: config.dir.clone(),
                    guard: Mutex::new(()),
                })
            }
        };
        Ok(Self {
            ttl_ms: u64::try_from(config.ttl.as_millis()).unwrap_or(u64::MAX),
            capacity: config.capacity,
            clock,
            backend,
        })
    }

    /// Store `group` under its prompt-derived key, overwriting any previous group.
    ///
    /// Stamps the group's creation time, then sweeps expired entries and evicts the oldest
    /// beyond capacity. Returns the key to fetch chunks with.
    pub fn put(&self, mut group: ChunkGroup) -> Result<String> {
        if group.chunk_count() < 2 {
            return Err(ChangeModeError::NotPageable(group.chunk_count()));
        }

        let now = self.clock.now_unix_ms();
        let key = group.cache_key();
        group.created_unix_ms = now;

        match &self.backend {
            Backend::Memory(cache) => {
                let mut cache = lock(cache);
                cache.insert(key.clone(), group);
                cache.prune(now, self.ttl_ms, self.capacity);
            }
            Backend::File(files) => {
                let _guard = lock(&files.guard);
                files.write(&key, &group)?;
                files.prune(now, self.ttl_ms, self.capacity);
            }
        }

        log::debug!("Cached chunk group {key} (ttl {}ms)", self.ttl_ms);
        Ok(key)
    }

    /// Fetch the chunk at 1-based `index` of the group stored under `key`
    pub fn get(&self, key: &str, index: usize) -> std::result::Result<ChunkHit, CacheMiss> {
        let absent = || CacheMiss::Absent {
            key: key.to_string(),
        };
        if !is_well_formed_key(key) {
            return Err(absent());
        }

        let now = self.clock.now_unix_ms();
        let group = match &self.backend {
            Backend::Memory(cache) => lock(cache).get(key, now, self.ttl_ms),
            Backend::File(files) => {
                let _guard = lock(&files.guard);
                files.read_live(key, now, self.ttl_ms)
            }
        }
        .ok_or_else(absent)?;

        let total = group.chunk_count();
        if index == 0 || index > total {
            return Err(CacheMiss::IndexOutOfRange {
                index,
                available: total,
            });
        }

        let chunk = group
            .chunks
            .into_iter()
            .nth(index - 1)
            .ok_or_else(absent)?;
        Ok(ChunkHit {
            chunk,
            index,
            total,
        })
    }

    /// Housekeeping pass: drop expired entries and evict beyond capacity.
    ///
    /// Returns the number of live entries afterwards.
    pub fn prune(&self) -> usize {
        let now = self.clock.now_unix_ms();
        match &self.backend {
            Backend::Memory(cache) => {
                let mut cache = lock(cache);
                cache.prune(now, self.ttl_ms, self.capacity);
                cache.order.len()
            }
            Backend::File(files) => {
                let _guard = lock(&files.guard);
                files.prune(now, self.ttl_ms, self.capacity)
            }
        }
    }

    /// Number of entries that have not expired
    pub fn len(&self) -> usize {
        let now = self.clock.now_unix_ms();
        match &self.backend {
            Backend::Memory(cache) => lock(cache)
                .groups
                .values()
                .filter(|g| !is_expired(g.created_unix_ms, now, self.ttl_ms))
                .count(),
            Backend::File(files) => {
                let _guard = lock(&files.guard);
                files
                    .list_records()
                    .into_iter()
                    .filter(|(_, group)| !is_expired(group.created_unix_ms, now, self.ttl_ms))
                    .count()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Entries are replaced whole, so a poisoned lock still guards consistent state.
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

const fn is_expired(created_unix_ms: u64, now_unix_ms: u64, ttl_ms: u64) -> bool {
    now_unix_ms.saturating_sub(created_unix_ms) > ttl_ms
}

#[derive(Default)]
struct MemCache {
    groups: HashMap<String, ChunkGroup>,
    /// Keys by creation time, oldest first
    order: VecDeque<String>,
}

impl MemCache {
    fn insert(&mut self, key: String, group: ChunkGroup) {
        self.order.retain(|k| k != &key);
        self.order.push_back(key.clone());
        self.groups.insert(key, group);
    }

    fn get(&mut self, key: &str, now: u64, ttl_ms: u64) -> Option<ChunkGroup> {
        let group = self.groups.get(key)?;
        if is_expired(group.created_unix_ms, now, ttl_ms) {
            self.groups.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }
        Some(group.clone())
    }

    fn prune(&mut self, now: u64, ttl_ms: u64, capacity: usize) {
        self.groups
            .retain(|_, group| !is_expired(group.created_unix_ms, now, ttl_ms));
        let groups = &self.groups;
        self.order.retain(|key| groups.contains_key(key));

        while self.order.len() > capacity {
            if let Some(evicted) = self.order.pop_front() {
                log::debug!("Evicting chunk group {evicted}");
                self.groups.remove(&evicted);
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedChunkGroup {
    v: u32,
    key: String,
    group: ChunkGroup,
}

struct FileCache {
    dir: PathBuf,
    /// Serializes this process's access; the lock file covers other processes
    guard: Mutex<()>,
}

impl FileCache {
    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write(&self, key: &str, group: &ChunkGroup) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let _lock = acquire_dir_lock_best_effort(&self.dir);

        let record = PersistedChunkGroup {
            v: RECORD_VERSION,
            key: key.to_string(),
            group: group.clone(),
        };
        let data = serde_json::to_vec(&record)?;

        // Readers see either the previous record or the new one, never a partial write.
        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read_live(&self, key: &str, now: u64, ttl_ms: u64) -> Option<ChunkGroup> {
        let path = self.record_path(key);
        let group = read_record(&path, key)?;
        if is_expired(group.created_unix_ms, now, ttl_ms) {
            remove_best_effort(&path);
            return None;
        }
        Some(group)
    }

    /// All readable records; unreadable ones are deleted on the way
    fn list_records(&self) -> Vec<(PathBuf, ChunkGroup)> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(key) = record_key(&path) else {
                continue;
            };
            if let Some(group) = read_record(&path, &key) {
                records.push((path, group));
            }
        }
        records
    }

    fn prune(&self, now: u64, ttl_ms: u64, capacity: usize) -> usize {
        let _lock = acquire_dir_lock_best_effort(&self.dir);

        let mut live = Vec::new();
        for (path, group) in self.list_records() {
            if is_expired(group.created_unix_ms, now, ttl_ms) {
                remove_best_effort(&path);
            } else {
                live.push((group.created_unix_ms, path));
            }
        }

        live.sort();
        let excess = live.len().saturating_sub(capacity);
        for (_, path) in live.drain(..excess) {
            log::debug!("Evicting chunk record {}", path.display());
            remove_best_effort(&path);
        }
        live.len()
    }
}

fn record_key(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    is_well_formed_key(stem).then(|| stem.to_string())
}

/// Read and decode a record; corrupt records are removed and reported as absent.
fn read_record(path: &Path, expected_key: &str) -> Option<ChunkGroup> {
    let bytes = std::fs::read(path).ok()?;
    let record: PersistedChunkGroup = match serde_json::from_slice(&bytes) {
        Ok(record) => record,
        Err(err) => {
            log::warn!("Chunk record corrupted {}: {err}", path.display());
            remove_best_effort(path);
            return None;
        }
    };
    if record.v != RECORD_VERSION || record.key != expected_key {
        log::warn!("Ignoring incompatible chunk record {}", path.display());
        remove_best_effort(path);
        return None;
    }
    Some(record.group)
}

fn remove_best_effort(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::debug!("Failed to remove {}: {err}", path.display());
        }
    }
}

fn acquire_dir_lock_best_effort(dir: &Path) -> Option<std::fs::File> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(dir.join(LOCK_FILE_NAME))
        .ok()?;
    file.lock_exclusive().ok()?;
    Some(file)
}
