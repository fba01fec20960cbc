use serde::Serialize;
use std::path::PathBuf;
use themeshift_rewrite::RewriteWarning;

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Output differed; written back unless the batch was a dry run
    Changed { replacements: usize },
    Unchanged,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RewriteWarning>,
}

impl FileReport {
    pub fn failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            status: FileStatus::Failed {
                reason: reason.into(),
            },
            warnings: Vec::new(),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self.status, FileStatus::Changed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Aggregate result of a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,

    /// Files whose text changed
    pub changed: usize,

    pub unchanged: usize,

    /// Files that could not be read or written
    pub failed: usize,

    /// Warnings across all files
    pub warnings: usize,

    /// Total replacements across changed files
    pub replacements: usize,

    /// True when nothing was written
    pub dry_run: bool,

    /// Time taken in milliseconds
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn add_file(&mut self, report: FileReport) {
        match &report.status {
            FileStatus::Changed { replacements } => {
                self.changed += 1;
                self.replacements += replacements;
            }
            FileStatus::Unchanged => self.unchanged += 1,
            FileStatus::Failed { .. } => self.failed += 1,
        }
        self.warnings += report.warnings.len();
        self.files.push(report);
    }

    /// No failures and no warnings
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.warnings == 0
    }

    /// Some file changed, or would change in a dry run
    pub fn has_changes(&self) -> bool {
        self.changed > 0
    }
}
