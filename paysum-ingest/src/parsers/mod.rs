//! Platform-specific export adapters.

pub mod alipay;
pub mod wechat;

use std::path::Path;

use paysum_core::{Direction, Source};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::normalize::{normalize, DirectionRule};
use crate::types::{AdapterReport, ColumnMap, Field, FileSummary, NeutralRule};

pub use alipay::AlipayAdapter;
pub use wechat::WechatAdapter;

/// Turns one export file of a known platform into canonical records
pub trait SourceAdapter {
    /// Identity stamped on every record this adapter produces
    fn source(&self) -> Source;

    /// Read, rename, filter and normalize one file
    fn adapt(&self, path: &Path) -> Result<AdapterReport>;
}

/// Shared tail of every adapter once the header row is known.
///
/// Rows whose raw direction label matches `neutral` are dropped before
/// normalization. When the export has a direction column, rows whose label
/// names neither income nor expense are dropped as neutral too; only exports
/// without one fall back to the amount sign. Entirely blank rows are ignored.
pub(crate) fn adapt_table(
    path: &Path,
    source: &Source,
    rows: &[Vec<String>],
    header_row: usize,
    columns: &ColumnMap,
    neutral: NeutralRule,
) -> Result<AdapterReport> {
    let header = rows.get(header_row).ok_or_else(|| {
        IngestError::format(
            path,
            format!("file has {} rows, expected a header on row {}", rows.len(), header_row + 1),
        )
    })?;

    let resolved = columns.resolve(header);
    for required in [Field::Timestamp, Field::Amount] {
        if !resolved.has(required) {
            return Err(IngestError::format(
                path,
                format!("row {} is not a header: no {required:?} column", header_row + 1),
            ));
        }
    }

    let mut rows_read = 0;
    let mut neutral_dropped = 0;
    let mut candidates = Vec::new();
    for row in &rows[header_row + 1..] {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows_read += 1;
        let raw = resolved.extract(row, source);
        if raw.direction.as_deref().is_some_and(|label| neutral.matches(label)) {
            neutral_dropped += 1;
            continue;
        }
        candidates.push(raw);
    }

    let rule = if resolved.has(Field::Direction) {
        DirectionRule::Label
    } else {
        DirectionRule::AmountSign
    };
    let mut normalized = normalize(candidates, rule);
    let before = normalized.records.len();
    normalized.records.retain(|r| r.direction != Direction::Neutral);
    neutral_dropped += before - normalized.records.len();

    if neutral_dropped > 0 {
        info!(path = %path.display(), count = neutral_dropped, "dropped neutral rows");
    } else {
        debug!(path = %path.display(), "no neutral rows");
    }

    let summary = FileSummary {
        path: path.to_path_buf(),
        source: source.clone(),
        header_row,
        rows_read,
        neutral_dropped,
        invalid_dropped: normalized.dropped,
        kept: normalized.records.len(),
    };

    info!(
        path = %path.display(),
        source = %source,
        rows = rows_read,
        invalid = summary.invalid_dropped,
        kept = summary.kept,
        "adapted export"
    );

    Ok(AdapterReport {
        summary,
        records: normalized.records,
    })
}
