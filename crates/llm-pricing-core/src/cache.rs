use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};

/// Snapshot TTL: 3,600,000 ms.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(60 * 60);

/// Storage for raw catalog bodies, keyed by a file-name-like string.
pub trait SnapshotCache: Send + Sync {
    /// Return the stored bytes if a usable snapshot exists.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Default snapshot directory: `<system temp>/llm-pricing`.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("llm-pricing")
}

/// Filesystem snapshots, one file per key, valid while younger than `ttl`.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Age of the snapshot for `key`, from its modification time.
    /// `None` when the file is missing or its mtime lies in the future.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let modified = std::fs::metadata(self.path(key)).ok()?.modified().ok()?;
        SystemTime::now().duration_since(modified).ok()
    }
}

impl SnapshotCache for FsCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let age = self.age(key)?;
        if !is_fresh(age, self.ttl) {
            tracing::debug!(key, age_s = age.as_secs(), "snapshot expired");
            return None;
        }
        let bytes = std::fs::read(self.path(key)).ok()?;
        tracing::debug!(key, age_s = age.as_secs(), "using snapshot");
        Some(bytes)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        write_atomic(&self.path(key), bytes)
    }
}

/// A snapshot is usable only while its age is strictly below the TTL.
pub fn is_fresh(age: Duration, ttl: Duration) -> bool {
    age < ttl
}

/// In-process snapshots; never expire.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), bytes.into());
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl SnapshotCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Other("memory cache lock poisoned".into()))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Write `content` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("snapshot"),
        std::process::id()
    ));

    {
        let mut file = std::fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
        file.write_all(content)
            .and_then(|()| file.sync_all())
            .map_err(|e| Error::io(&temp_path, e))?;
    }

    std::fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdate(path: &Path, by: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn freshness_is_strict() {
        assert!(is_fresh(Duration::from_secs(3599), SNAPSHOT_TTL));
        assert!(!is_fresh(SNAPSHOT_TTL, SNAPSHOT_TTL));
    }

    #[test]
    fn fs_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path().join("nested"), SNAPSHOT_TTL);
        assert!(cache.get("prices.json").is_none());

        cache.put("prices.json", b"{}").unwrap();
        assert_eq!(cache.get("prices.json").as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn fs_cache_honors_ttl_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), SNAPSHOT_TTL);

        cache.put("recent.json", b"[1]").unwrap();
        backdate(&cache.path("recent.json"), Duration::from_secs(59 * 60));
        assert!(cache.get("recent.json").is_some(), "59 minutes old should be reused");

        cache.put("old.json", b"[2]").unwrap();
        backdate(&cache.path("old.json"), Duration::from_secs(61 * 60));
        assert!(cache.get("old.json").is_none(), "61 minutes old should be stale");
    }

    #[test]
    fn put_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path(), SNAPSHOT_TTL);
        cache.put("a.json", b"first").unwrap();
        cache.put("a.json", b"second").unwrap();

        assert_eq!(std::fs::read(cache.path("a.json")).unwrap(), b"second");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "unexpected files: {names:?}");
    }

    #[test]
    fn memory_cache_stores_bytes() {
        let cache = MemoryCache::new().with_entry("k", "v");
        assert!(cache.contains("k"));
        cache.put("other", b"x").unwrap();
        assert_eq!(cache.get("other"), Some(b"x".to_vec()));
        assert!(cache.get("missing").is_none());
    }
}
