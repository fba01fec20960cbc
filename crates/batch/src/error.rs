use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BatchError>;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl BatchError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            BatchError::Read { path, .. }
            | BatchError::Write { path, .. }
            | BatchError::Persist { path, .. } => path,
        }
    }
}
