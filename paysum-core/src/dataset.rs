//! The merged, time-ordered dataset handed to report renderers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{Direction, Source, TransactionRecord};

/// Immutable set of canonical records, most recent first.
///
/// Ordering is a stable sort on `timestamp` descending, so records with the
/// same timestamp keep the order in which they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<TransactionRecord>,
}

impl Dataset {
    /// Build a dataset. Neutral records are discarded.
    pub fn new(mut records: Vec<TransactionRecord>) -> Self {
        records.retain(|r| r.direction != Direction::Neutral);
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { records }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn income(&self) -> impl Iterator<Item = &TransactionRecord> + Clone {
        self.records.iter().filter(|r| r.is_income())
    }

    pub fn expenses(&self) -> impl Iterator<Item = &TransactionRecord> + Clone {
        self.records.iter().filter(|r| r.is_expense())
    }

    /// Number of records per source, in source id order
    pub fn count_by_source(&self) -> BTreeMap<Source, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.source.clone()).or_insert(0) += 1;
        }
        counts
    }
}
