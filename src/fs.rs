//! Local filesystem access
//!
//! Thin blocking wrapper behind a trait so the executor can run against
//! an in-memory filesystem in tests.

use std::path::{Path, PathBuf};

use crate::error::{IglooError, IglooResult};

/// Abstract local filesystem interface
pub trait FileSystem {
    /// Read file content
    fn read_bytes(&self, path: &Path) -> IglooResult<Vec<u8>>;

    /// Write file content, creating or truncating
    fn write_bytes(&self, path: &Path, data: &[u8]) -> IglooResult<()>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Plain files in the current directory, sorted for stable output
    fn list_files(&self) -> IglooResult<Vec<String>>;
}

/// Standard blocking filesystem implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read_bytes(&self, path: &Path) -> IglooResult<Vec<u8>> {
        std::fs::read(path).map_err(|source| IglooError::LocalIo {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_bytes(&self, path: &Path, data: &[u8]) -> IglooResult<()> {
        std::fs::write(path, data).map_err(|source| IglooError::LocalIo {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self) -> IglooResult<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(".")?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Mock filesystem for testing
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and shared.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockFileSystem {
    pub files: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<PathBuf, Vec<u8>>>>,
    pub deny_writes: std::sync::Arc<std::sync::Mutex<std::collections::HashSet<PathBuf>>>,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(names: &[(&str, &[u8])]) -> Self {
        let mock = Self::new();
        {
            let mut files = mock.files.lock().unwrap();
            for (name, data) in names {
                files.insert(PathBuf::from(name), data.to_vec());
            }
        }
        mock
    }

    pub fn deny_write(&self, path: &str) {
        self.deny_writes.lock().unwrap().insert(PathBuf::from(path));
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read_bytes(&self, path: &Path) -> IglooResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| IglooError::LocalIo {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            })
    }

    fn write_bytes(&self, path: &Path, data: &[u8]) -> IglooResult<()> {
        if self.deny_writes.lock().unwrap().contains(path) {
            return Err(IglooError::LocalIo {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "write denied",
                ),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn list_files(&self) -> IglooResult<Vec<String>> {
        let mut names: Vec<String> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}
