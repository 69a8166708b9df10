use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::error::{BoardError, BoardResult};

/// Key/value store backing feed snapshots. Values are only ever replaced
/// whole, never partially written.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> BoardResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> BoardResult<()>;
}

type SharedEntries = Arc<Mutex<HashMap<String, String>>>;

/// In-process store. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub data: SharedEntries,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> BoardResult<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|e| BoardError::CacheRead(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BoardResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| BoardError::Storage(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping one file per key, so snapshots survive restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> BoardResult<FileStore> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> BoardResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BoardError::CacheRead(format!("{key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> BoardResult<()> {
        // Write aside then rename, readers see either the old or the new value.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}
