//! Header row location by keyword co-occurrence.

use std::path::Path;

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::table::read_rows;

/// Rows scanned when searching for a header
pub const DEFAULT_SEARCH_WINDOW: usize = 30;

/// First row within `window` whose concatenated cells contain every keyword.
///
/// Matching is exact substring containment: no case folding, no whitespace
/// normalization.
pub fn find_header_row<K: AsRef<str>>(rows: &[Vec<String>], keywords: &[K], window: usize) -> Option<usize> {
    if keywords.is_empty() {
        return None;
    }
    rows.iter().take(window).position(|row| {
        let joined = row.concat();
        keywords.iter().all(|k| joined.contains(k.as_ref()))
    })
}

/// Probe the first `window` rows of a file for the header row (0-based).
///
/// Only the scanned prefix is read.
pub fn locate_header<K: AsRef<str>>(path: &Path, keywords: &[K], window: usize) -> Result<usize> {
    if keywords.is_empty() {
        return Err(IngestError::format(path, "no header keywords given"));
    }

    let rows = read_rows(path, Some(window))?;
    let idx = find_header_row(&rows, keywords, window).ok_or_else(|| {
        let wanted: Vec<&str> = keywords.iter().map(|k| k.as_ref()).collect();
        IngestError::format(
            path,
            format!("no row within the first {window} rows contains all of {wanted:?}"),
        )
    })?;

    debug!(path = %path.display(), row = idx, "located header row");
    Ok(idx)
}
