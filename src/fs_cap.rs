//! Filesystem capability seam.
//!
//! The dispatcher never touches the filesystem directly; every file operation
//! goes through the `FileSystem` trait so tests can substitute an in-memory
//! fake. `LocalFileSystem` is the production implementation over `std::fs`,
//! with errors normalized into the `FsError` taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type FsResult<T> = Result<T, FsError>;

/// Normalized filesystem failure kinds surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsError {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    NotEmpty,
    IsADirectory,
    NotADirectory,
    Io(String),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::NotFound => write!(f, "No such file or directory"),
            FsError::PermissionDenied => write!(f, "Permission denied"),
            FsError::AlreadyExists => write!(f, "File exists"),
            FsError::NotEmpty => write!(f, "Directory not empty"),
            FsError::IsADirectory => write!(f, "Is a directory"),
            FsError::NotADirectory => write!(f, "Not a directory"),
            FsError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
            _ => {
                // DirectoryNotEmpty and the Is/NotADirectory kinds are not
                // stable on every toolchain; fall back to the OS message.
                let msg = err.to_string();
                let lower = msg.to_lowercase();
                if lower.contains("not empty") {
                    FsError::NotEmpty
                } else if lower.contains("is a directory") {
                    FsError::IsADirectory
                } else if lower.contains("not a directory") {
                    FsError::NotADirectory
                } else {
                    FsError::Io(msg)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Dir,
}

/// One directory listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub kind: EntryKind,
    pub size: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Capability interface for all file and directory operations.
pub trait FileSystem {
    /// List a directory's entries. Order is unspecified; callers sort.
    fn list(&self, path: &Path) -> FsResult<Vec<Entry>>;
    fn metadata(&self, path: &Path) -> FsResult<Metadata>;
    /// Create a directory, including missing parents. Existing is not an error.
    fn make_dir(&self, path: &Path) -> FsResult<()>;
    /// Remove a file, or a directory tree recursively.
    fn remove(&self, path: &Path) -> FsResult<()>;
    /// Copy a file, or a directory tree recursively.
    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()>;
    fn rename(&self, src: &Path, dst: &Path) -> FsResult<()>;
    fn read_to_string(&self, path: &Path) -> FsResult<String>;
    /// Create an empty file if missing; an existing file is left untouched.
    fn create_empty(&self, path: &Path) -> FsResult<()>;
    fn write_text(&self, path: &Path, text: &str) -> FsResult<()>;
    /// Enumerate all files under a directory, recursively.
    fn walk(&self, path: &Path) -> FsResult<Vec<PathBuf>>;
}

/// Production filesystem over `std::fs`.
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn copy_dir_recursive(src: &Path, dst: &Path) -> FsResult<()> {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let target = dst.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                Self::copy_dir_recursive(&entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> FsResult<()> {
        let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                Self::walk_into(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl FileSystem for LocalFileSystem {
    fn list(&self, path: &Path) -> FsResult<Vec<Entry>> {
        let meta = fs::metadata(path)?;
        if !meta.is_dir() {
            return Err(FsError::NotADirectory);
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: if meta.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
                size: meta.len(),
            });
        }
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> FsResult<Metadata> {
        let meta = fs::metadata(path)?;
        Ok(Metadata {
            kind: if meta.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            },
            size: meta.len(),
        })
    }

    fn make_dir(&self, path: &Path) -> FsResult<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> FsResult<()> {
        let meta = fs::metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        let meta = fs::metadata(src)?;
        if meta.is_dir() {
            Self::copy_dir_recursive(src, dst)
        } else {
            // cp file dir/ writes into the directory, like the real tool.
            let target = match fs::metadata(dst) {
                Ok(m) if m.is_dir() => match src.file_name() {
                    Some(name) => dst.join(name),
                    None => dst.to_path_buf(),
                },
                _ => dst.to_path_buf(),
            };
            fs::copy(src, &target)?;
            Ok(())
        }
    }

    fn rename(&self, src: &Path, dst: &Path) -> FsResult<()> {
        fs::metadata(src)?;
        let target = match fs::metadata(dst) {
            Ok(m) if m.is_dir() => match src.file_name() {
                Some(name) => dst.join(name),
                None => dst.to_path_buf(),
            },
            _ => dst.to_path_buf(),
        };
        fs::rename(src, &target)?;
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let meta = fs::metadata(path)?;
        if meta.is_dir() {
            return Err(FsError::IsADirectory);
        }
        Ok(fs::read_to_string(path)?)
    }

    fn create_empty(&self, path: &Path) -> FsResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(())
    }

    fn write_text(&self, path: &Path, text: &str) -> FsResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, text)?;
        Ok(())
    }

    fn walk(&self, path: &Path) -> FsResult<Vec<PathBuf>> {
        let meta = fs::metadata(path)?;
        if !meta.is_dir() {
            return Err(FsError::NotADirectory);
        }
        let mut out = Vec::new();
        Self::walk_into(path, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(FsError::from(err), FsError::NotFound);

        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(FsError::from(err), FsError::PermissionDenied);

        let err = io::Error::other("Directory not empty (os error 39)");
        assert_eq!(FsError::from(err), FsError::NotEmpty);
    }

    #[test]
    fn test_local_roundtrip() {
        let dir = std::env::temp_dir().join(format!("nlshell_fs_{}", std::process::id()));
        let fs_cap = LocalFileSystem::new();
        fs_cap.make_dir(&dir).unwrap();

        let file = dir.join("x.txt");
        fs_cap.create_empty(&file).unwrap();
        assert_eq!(fs_cap.metadata(&file).unwrap().kind, EntryKind::File);

        fs_cap.write_text(&file, "hello").unwrap();
        assert_eq!(fs_cap.read_to_string(&file).unwrap(), "hello");

        // create_empty must not truncate an existing file
        fs_cap.create_empty(&file).unwrap();
        assert_eq!(fs_cap.read_to_string(&file).unwrap(), "hello");

        let names: Vec<String> = fs_cap
            .list(&dir)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["x.txt"]);

        fs_cap.remove(&dir).unwrap();
        assert_eq!(fs_cap.metadata(&dir).unwrap_err(), FsError::NotFound);
    }

    #[test]
    fn test_read_directory_is_error() {
        let fs_cap = LocalFileSystem::new();
        let err = fs_cap.read_to_string(&std::env::temp_dir()).unwrap_err();
        assert_eq!(err, FsError::IsADirectory);
    }
}
