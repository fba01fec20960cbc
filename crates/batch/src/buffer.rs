use crate::error::{BatchError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Full text of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    pub path: PathBuf,
    pub text: String,
}

impl SourceBuffer {
    /// Read a whole file as UTF-8
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Replace the file on disk with `text`.
    ///
    /// The new content goes to a temp file in the same directory and is
    /// renamed over the original, so readers see either the old or the new
    /// file and a failed write leaves the original intact.
    pub fn write_atomic(&self, text: &str) -> Result<()> {
        let path = self.path.as_path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source: std::io::Error| BatchError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;

        tmp.persist(path).map_err(|source| BatchError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.dart");
        fs::write(&path, "old").unwrap();

        let buffer = SourceBuffer::read(&path).unwrap();
        assert_eq!(buffer.text, "old");
        buffer.write_atomic("new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.dart");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        SourceBuffer::read(&path).unwrap().write_atomic("new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn read_missing_file_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.dart");
        let err = SourceBuffer::read(&path).unwrap_err();
        assert_eq!(err.path(), path.as_path());
        assert!(matches!(err, BatchError::Read { .. }));
    }
}
