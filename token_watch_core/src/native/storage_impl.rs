// Native file-based storage implementation

use crate::storage_trait::{StorageBackend, StorageResult};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// File-based storage backend for native (CLI) mode: one `<key>.json` per key
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a new file storage backend with the specified base directory
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the full path for a storage key
    fn get_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.get_path(key);
        debug!("Loading data from file: {:?}", path);

        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("File does not exist: {:?}", path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.get_path(key);
        debug!("Saving data to file: {:?}", path);

        fs::create_dir_all(&self.base_dir)?;
        // Write beside the target and rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.get_path(key);
        debug!("Removing file: {:?}", path);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
