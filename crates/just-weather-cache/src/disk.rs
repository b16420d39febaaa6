//! One JSON file per cache entry

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use just_weather_core::{CacheEntry, Error, Result};

const ENTRY_EXT: &str = "json";
const TMP_SUFFIX: &str = ".json.tmp";

/// `<sha256-hex(key)>.json`
///
/// Stable across runs and platforms; only used to make keys filesystem-safe.
pub fn entry_file_name(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{}.{ENTRY_EXT}", hex::encode(digest))
}

/// Whether `name` looks like a file this store wrote
fn is_entry_file(name: &str) -> bool {
    let stem = name
        .strip_suffix(TMP_SUFFIX)
        .or_else(|| name.strip_suffix(".json"));
    stem.is_some_and(|s| s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Directory of entry files
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Use `root`, creating it (and parents) if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            Error::io(format!(
                "failed to create cache directory {}: {e}",
                root.display()
            ))
        })?;
        debug!(dir = %root.display(), "opened cache directory");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(entry_file_name(key))
    }

    /// Persist `entry`, replacing any previous file for its key
    ///
    /// Written to a temporary file and renamed so a reader never sees a
    /// partially written entry from this process.
    pub fn write(&self, entry: &CacheEntry) -> Result<()> {
        let path = self.path_for(&entry.key);
        let tmp = path.with_extension(&TMP_SUFFIX[1..]);

        let json = serde_json::to_vec(entry)
            .map_err(|e| Error::io(format!("failed to encode cache entry: {e}")))?;

        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(Error::io(format!(
                "failed to write cache file {}: {e}",
                path.display()
            )));
        }
        trace!(key = %entry.key, file = %path.display(), "entry written");
        Ok(())
    }

    /// Load the entry for `key`
    ///
    /// Missing, unreadable or corrupt files and files belonging to another key
    /// all come back as `None`.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to read cache file");
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.key == key => Some(entry),
            Ok(entry) => {
                warn!(file = %path.display(), stored = %entry.key, key, "cache file key mismatch");
                None
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "corrupt cache file");
                None
            }
        }
    }

    /// Delete the file for `key`. A missing file is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!(
                "failed to delete cache file {}: {e}",
                path.display()
            ))),
        }
    }

    /// Delete every entry file, leaving the directory and unrelated files
    ///
    /// Best effort: returns the number of files that could not be deleted.
    pub fn clear(&self) -> usize {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) => {
                warn!(dir = %self.root.display(), error = %e, "failed to list cache directory");
                return 0;
            }
        };

        let mut failures = 0;
        for dirent in dir.flatten() {
            let name = dirent.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_entry_file(name) {
                continue;
            }
            if let Err(e) = fs::remove_file(dirent.path()) {
                warn!(file = name, error = %e, "failed to delete cache file");
                failures += 1;
            }
        }
        failures
    }
}
