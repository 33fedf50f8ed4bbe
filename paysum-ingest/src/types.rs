use std::path::PathBuf;

use paysum_core::{format_timestamp, Source, TransactionRecord};
use serde::Serialize;

/// Canonical column a source header can be renamed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Timestamp,
    Category,
    Counterparty,
    Description,
    Direction,
    Amount,
    PaymentMethod,
}

/// A data row after renaming, before coercion. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub timestamp: Option<String>,
    pub category: Option<String>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    /// Raw 收/支 label
    pub direction: Option<String>,
    pub amount: Option<String>,
    pub payment_method: Option<String>,
    pub source: Source,
}

impl RawRecord {
    pub fn new(source: Source) -> Self {
        Self {
            timestamp: None,
            category: None,
            counterparty: None,
            description: None,
            direction: None,
            amount: None,
            payment_method: None,
            source,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::Timestamp => &mut self.timestamp,
            Field::Category => &mut self.category,
            Field::Counterparty => &mut self.counterparty,
            Field::Description => &mut self.description,
            Field::Direction => &mut self.direction,
            Field::Amount => &mut self.amount,
            Field::PaymentMethod => &mut self.payment_method,
        };
        *slot = value;
    }
}

/// Text form of an already-normalized record; normalizing it again is a no-op.
impl From<&TransactionRecord> for RawRecord {
    fn from(r: &TransactionRecord) -> Self {
        Self {
            timestamp: Some(format_timestamp(&r.timestamp)),
            category: r.category.clone(),
            counterparty: r.counterparty.clone(),
            description: r.description.clone(),
            direction: Some(r.direction.label().to_string()),
            amount: Some(r.amount.to_string()),
            payment_method: r.payment_method.clone(),
            source: r.source.clone(),
        }
    }
}

/// Fixed rename table from source header names to canonical fields.
///
/// Several names may map to one field; the earlier entry wins when both
/// are present in a header.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    entries: &'static [(&'static str, Field)],
}

impl ColumnMap {
    pub const fn new(entries: &'static [(&'static str, Field)]) -> Self {
        Self { entries }
    }

    /// Match header cells (trimmed) against the table
    pub fn resolve(&self, header: &[String]) -> ResolvedColumns {
        let mut columns: Vec<(Field, usize)> = Vec::new();
        for (name, field) in self.entries {
            if columns.iter().any(|(f, _)| f == field) {
                continue;
            }
            if let Some(idx) = header.iter().position(|h| h.trim() == *name) {
                columns.push((*field, idx));
            }
        }
        ResolvedColumns { columns }
    }
}

/// Column indices for one concrete header row
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
    columns: Vec<(Field, usize)>,
}

impl ResolvedColumns {
    pub fn has(&self, field: Field) -> bool {
        self.columns.iter().any(|(f, _)| *f == field)
    }

    pub fn extract(&self, row: &[String], source: &Source) -> RawRecord {
        let mut raw = RawRecord::new(source.clone());
        for (field, idx) in &self.columns {
            let value = row
                .get(*idx)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            raw.set(*field, value);
        }
        raw
    }
}

/// How a platform marks transactions that are neither income nor expense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralRule {
    /// Whole label (trimmed) equals the token
    Exact(&'static str),
    /// Label contains the phrase anywhere
    Contains(&'static str),
}

impl NeutralRule {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            NeutralRule::Exact(token) => label.trim() == *token,
            NeutralRule::Contains(phrase) => label.contains(phrase),
        }
    }
}

/// Per-file counts reported after adaptation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub source: Source,
    /// 0-based row index of the header used
    pub header_row: usize,
    /// Data rows below the header
    pub rows_read: usize,
    pub neutral_dropped: usize,
    /// Rows dropped for an unparseable timestamp or amount
    pub invalid_dropped: usize,
    pub kept: usize,
}

/// Output of one adapter run
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterReport {
    pub summary: FileSummary,
    pub records: Vec<TransactionRecord>,
}
