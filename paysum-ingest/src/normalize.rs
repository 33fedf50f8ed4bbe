//! Shared post-adapter cleaning: timestamp and amount coercion, null rejection.

use std::str::FromStr;

use paysum_core::{parse_timestamp, Direction, TransactionRecord};
use rust_decimal::Decimal;

use crate::types::RawRecord;

/// Result of a normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub records: Vec<TransactionRecord>,
    /// Rows dropped because timestamp or amount did not coerce
    pub dropped: usize,
}

/// Strip everything but digits, `.` and `-`, then parse. `None` when nothing parses.
pub fn sanitize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// How a row's income/expense side is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionRule {
    /// The export carries a direction column; a label naming neither income
    /// nor expense (including a blank one) makes the row neutral
    Label,
    /// No direction column; a negative amount is an expense
    AmountSign,
}

/// Coerce one row. `None` when timestamp or amount is missing or unparseable.
pub fn normalize_record(raw: RawRecord, rule: DirectionRule) -> Option<TransactionRecord> {
    let timestamp = raw.timestamp.as_deref().and_then(parse_timestamp)?;
    let amount = raw.amount.as_deref().and_then(sanitize_amount)?;
    let labelled = raw.direction.as_deref().and_then(Direction::from_label);
    let direction = match rule {
        DirectionRule::Label => labelled.unwrap_or(Direction::Neutral),
        DirectionRule::AmountSign => labelled.unwrap_or_else(|| Direction::from_amount(amount)),
    };

    Some(TransactionRecord {
        timestamp,
        category: raw.category,
        counterparty: raw.counterparty,
        description: raw.description,
        direction,
        amount,
        payment_method: raw.payment_method,
        source: raw.source,
    })
}

/// Normalize a batch, preserving row order
pub fn normalize(rows: Vec<RawRecord>, rule: DirectionRule) -> Normalized {
    let total = rows.len();
    let records: Vec<TransactionRecord> = rows
        .into_iter()
        .filter_map(|raw| normalize_record(raw, rule))
        .collect();
    Normalized {
        dropped: total - records.len(),
        records,
    }
}
