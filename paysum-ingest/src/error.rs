use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning bill exports into canonical records.
///
/// Field-level coercion failures are not errors; they only show up in the
/// per-file drop counts.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Unreadable file, unsupported extension, or no usable header row
    #[error("format error in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Nothing was found, or every file found failed
    #[error("no usable bill exports (found {files_found}, none could be adapted)")]
    NoData { files_found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
