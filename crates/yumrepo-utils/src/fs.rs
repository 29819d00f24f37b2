use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    time::Duration,
};

use tempfile::NamedTempFile;

use crate::error::{FileSystemError, FileSystemResult};

pub trait FileSystemProvider {
    /// Creates a directory structure if it doesn't exist.
    ///
    /// If the directory already exists, this function does nothing. If the path exists but is
    /// not a directory, this function returns an error.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::Directory`] if the directory could not be created.
    /// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yumrepo_utils::error::FileSystemResult;
    /// use yumrepo_utils::fs::{FileSystemProvider, StandardFileSystemProvider};
    ///
    /// fn main() -> FileSystemResult<()> {
    ///     let fs = StandardFileSystemProvider;
    ///     fs.ensure_dir_exists("/tmp/yumrepo-doc/cache")?;
    ///     Ok(())
    /// }
    /// ```
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Replaces `path` with content produced by `write`, atomically.
    ///
    /// The closure receives a temporary file created next to `path`. Only when it returns `Ok`
    /// is the temporary file renamed over `path`; on error the temporary file is discarded and
    /// any existing file at `path` is left as it was. The rename gives the target a fresh
    /// modification time.
    ///
    /// The closure's error type only needs to absorb [`FileSystemError`], which lets callers
    /// keep errors raised while producing the content apart from errors raised by the disk.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::File`] if the temporary file cannot be created or flushed.
    /// * [`FileSystemError::Persist`] if the rename fails.
    /// * Whatever `write` returns.
    fn write_atomic<P, F, T, E>(&self, path: P, write: F) -> Result<T, E>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut File) -> Result<T, E>,
        E: From<FileSystemError>;

    /// Returns how long ago `path` was last modified.
    ///
    /// Returns `None` if the file does not exist or its metadata cannot be read. A
    /// modification time in the future yields a zero age.
    fn modified_age<P: AsRef<Path>>(&self, path: P) -> Option<Duration>;
}

#[derive(Default, Clone)]
pub struct StandardFileSystemProvider;

impl FileSystemProvider for StandardFileSystemProvider {
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            })?;
        } else if !path.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }

    fn write_atomic<P, F, T, E>(&self, path: P, write: F) -> Result<T, E>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut File) -> Result<T, E>,
        E: From<FileSystemError>,
    {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(|err| FileSystemError::File {
            path: dir.to_path_buf(),
            action: "stage",
            source: err,
        })?;

        let value = write(staged.as_file_mut())?;

        staged.flush().map_err(|err| FileSystemError::File {
            path: staged.path().to_path_buf(),
            action: "flush",
            source: err,
        })?;

        staged.persist(path).map_err(|err| FileSystemError::Persist {
            path: path.to_path_buf(),
            source: err.error,
        })?;

        Ok(value)
    }

    fn modified_age<P: AsRef<Path>>(&self, path: P) -> Option<Duration> {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(modified.elapsed().unwrap_or(Duration::ZERO))
    }
}

/// Creates a directory structure if it doesn't exist.
///
/// See [`FileSystemProvider::ensure_dir_exists`] for detailed documentation.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.ensure_dir_exists(path)
}

/// Atomically replaces `path` with the content produced by `write`.
///
/// See [`FileSystemProvider::write_atomic`] for detailed documentation.
pub fn write_atomic<P, F, T, E>(path: P, write: F) -> Result<T, E>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<T, E>,
    E: From<FileSystemError>,
{
    StandardFileSystemProvider.write_atomic(path, write)
}

/// Returns the time elapsed since `path` was last modified.
///
/// See [`FileSystemProvider::modified_age`] for detailed documentation.
pub fn modified_age<P: AsRef<Path>>(path: P) -> Option<Duration> {
    StandardFileSystemProvider.modified_age(path)
}
