//! Atomic structured-file operations.
//!
//! Documents are written to a temporary sibling, fsynced and renamed over
//! the target. [`FileLock`] serializes whole load/save sessions between
//! processes.

use classroom_core::error::ClassroomError;
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single file operation.
#[derive(Debug, Error)]
pub enum AtomicFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("cannot encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("cannot lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AtomicFileError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<AtomicFileError> for ClassroomError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::Decode { .. } | AtomicFileError::Encode { .. } => {
                ClassroomError::Serialization {
                    format: "file".to_string(),
                    message: e.to_string(),
                }
            }
            AtomicFileError::Io { .. } | AtomicFileError::Lock { .. } => {
                ClassroomError::io(e.to_string())
            }
        }
    }
}

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// Picks the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }

    fn encode<T: Serialize>(&self, data: &T) -> Result<String, String> {
        match self {
            FileFormat::Toml => toml::to_string_pretty(data).map_err(|e| e.to_string()),
            FileFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        }
    }

    fn decode<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        match self {
            FileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// A structured file replaced atomically on every save.
///
/// The new content is written to `.<name>.tmp` in the same directory,
/// fsynced, then renamed over the target, so readers see either the old or
/// the new document. Cross-process exclusion is the caller's business, see
/// [`FileLock`].
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle whose format follows the file extension.
    pub fn new(path: PathBuf) -> Self {
        let format = FileFormat::from_path(&path);
        Self::with_format(path, format)
    }

    pub fn with_format(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; `None` for a missing or blank file.
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AtomicFileError::io(&self.path)(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        self.format
            .decode(&content)
            .map(Some)
            .map_err(|message| AtomicFileError::Decode {
                path: self.path.clone(),
                message,
            })
    }

    /// Replaces the file with `data`.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let encoded = self
            .format
            .encode(data)
            .map_err(|message| AtomicFileError::Encode {
                path: self.path.clone(),
                message,
            })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(AtomicFileError::io(&dir))?;

        let tmp_path = dir.join(format!(".{}.tmp", self.file_name()));
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(encoded.as_bytes())?;
            tmp.sync_all()
        };
        write_tmp().map_err(AtomicFileError::io(&tmp_path))?;

        fs::rename(&tmp_path, &self.path).map_err(AtomicFileError::io(&self.path))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string())
    }
}

/// Exclusive advisory lock on `<path>.lock`, released on drop.
pub(crate) struct FileLock {
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Blocks until no other process holds the lock for `path`.
    pub(crate) fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");
        if let Some(dir) = lock_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(AtomicFileError::io(dir))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(AtomicFileError::io(&lock_path))?;
        file.lock_exclusive()
            .map_err(|source| AtomicFileError::Lock {
                path: lock_path.clone(),
                source,
            })?;

        Ok(Self { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/config.toml")), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("a/state.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a/state")), FileFormat::Json);
    }

    #[test]
    fn test_load_nonexistent_and_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let file = AtomicFile::<Counter>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_in_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["counter.toml", "counter.json"] {
            let file = AtomicFile::<Counter>::new(temp_dir.path().join(name));
            let counter = Counter {
                name: "visits".to_string(),
                count: 15,
            };

            file.save(&counter).unwrap();
            assert_eq!(file.load().unwrap(), Some(counter));
        }
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AtomicFile::<Counter>::new(path).load().unwrap_err();
        assert!(matches!(err, AtomicFileError::Decode { .. }));
        assert!(err.to_string().contains("state.json"));
        assert!(ClassroomError::from(err).to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_save_leaves_no_temp_or_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");
        let file = AtomicFile::<Counter>::new(path.clone());

        {
            let _lock = FileLock::acquire(&path).unwrap();
            assert!(temp_dir.path().join("nested").join("state.lock").exists());
            file.save(&Counter {
                name: "x".to_string(),
                count: 1,
            })
            .unwrap();
        }

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".state.json.tmp").exists());
        assert!(!temp_dir.path().join("nested").join("state.lock").exists());
    }
}
