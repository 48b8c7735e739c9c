//! Filesystem access used by the provisioner.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// File operations the provisioner depends on.
///
/// Implementations must make `create_new` fail with
/// [`io::ErrorKind::AlreadyExists`] when the path is taken, atomically with
/// respect to other creators; tracking-file uniqueness relies on it.
pub trait KeyFilesystem: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Append `contents` to an existing file in a single write.
    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create `path` exclusively and write `contents` to it.
    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`KeyFilesystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl KeyFilesystem for LocalFilesystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // No `create`: the trust store is supplied by the deployment.
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(contents)?;
        file.flush()
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

        if let Err(e) = file.write_all(contents).and_then(|()| file.flush()) {
            drop(file);
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "Failed to remove partially written file"
                );
            }
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authorized_keys");

        let err = LocalFilesystem.append(&path, b"key\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authorized_keys");
        fs::write(&path, "first\n").unwrap();

        LocalFilesystem.append(&path, b"second\n").unwrap();
        LocalFilesystem.append(&path, b"third\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\nthird\n");
    }

    #[test]
    fn test_create_new_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracked_1");

        LocalFilesystem.create_new(&path, b"original\n").unwrap();
        let err = LocalFilesystem.create_new(&path, b"replacement\n").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");
    }

    #[test]
    fn test_type_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();

        assert!(LocalFilesystem.is_file(&file));
        assert!(!LocalFilesystem.is_dir(&file));
        assert!(LocalFilesystem.is_dir(dir.path()));
        assert!(!LocalFilesystem.is_file(dir.path()));
        assert!(!LocalFilesystem.is_file(&dir.path().join("missing")));
    }
}
