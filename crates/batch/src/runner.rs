use crate::buffer::SourceBuffer;
use crate::error::Result;
use crate::report::{BatchReport, FileReport, FileStatus};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use themeshift_rewrite::RewriteEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Compute statuses without writing anything
    pub dry_run: bool,

    /// Process files on the rayon pool
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            parallel: true,
        }
    }
}

/// Applies one engine to many files, isolating failures per file
pub struct BatchRunner<'a> {
    engine: &'a RewriteEngine,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a RewriteEngine, options: BatchOptions) -> Self {
        Self { engine, options }
    }

    /// Process every path; reports keep the input order
    pub fn run(&self, paths: &[PathBuf]) -> BatchReport {
        let start = Instant::now();

        let files: Vec<FileReport> = if self.options.parallel {
            paths.par_iter().map(|path| self.process(path)).collect()
        } else {
            paths.iter().map(|path| self.process(path)).collect()
        };

        let mut report = BatchReport::new(self.options.dry_run);
        for file in files {
            report.add_file(file);
        }
        report.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!(
            "Processed {} files in {} ms: {} changed, {} unchanged, {} failed, {} warnings{}",
            report.files.len(),
            report.elapsed_ms,
            report.changed,
            report.unchanged,
            report.failed,
            report.warnings,
            if report.dry_run { " (dry run)" } else { "" }
        );
        report
    }

    /// Process one file; errors become a failed report
    pub fn process(&self, path: &Path) -> FileReport {
        match self.try_process(path) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("{e}");
                FileReport::failed(e.path().to_path_buf(), e.to_string())
            }
        }
    }

    fn try_process(&self, path: &Path) -> Result<FileReport> {
        let buffer = SourceBuffer::read(path)?;
        let outcome = self.engine.rewrite(&buffer.text);

        for warning in &outcome.warnings {
            log::warn!("{}: {warning}", path.display());
        }

        let status = if outcome.text == buffer.text {
            FileStatus::Unchanged
        } else {
            if !self.options.dry_run {
                buffer.write_atomic(&outcome.text)?;
            }
            FileStatus::Changed {
                replacements: outcome.replacements(),
            }
        };

        log::debug!(
            "{}: {:?} after {} round(s)",
            path.display(),
            status,
            outcome.rounds
        );

        Ok(FileReport {
            path: path.to_path_buf(),
            status,
            warnings: outcome.warnings,
        })
    }
}
