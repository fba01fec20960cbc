//! # Themeshift Batch
//!
//! Runs a [`themeshift_rewrite::RewriteEngine`] over a list of files.
//!
//! Each file is read whole, rewritten, and written back atomically only when
//! the text changed. A file that fails to read or write is reported as failed
//! and never stops the rest of the batch.

mod buffer;
mod error;
mod report;
mod runner;

pub use buffer::SourceBuffer;
pub use error::{BatchError, Result};
pub use report::{BatchReport, FileReport, FileStatus};
pub use runner::{BatchOptions, BatchRunner};
