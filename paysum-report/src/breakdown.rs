//! Categorical breakdowns: categories, income sources, payment methods,
//! merchants and per-category detail.

use std::collections::HashMap;

use paysum_core::{Dataset, TransactionRecord, UNCATEGORIZED_LABEL};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::summary::mean;

/// A labelled total (amounts are absolute for expense groupings)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub total: Decimal,
    pub count: usize,
}

/// One row of the income source analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeSource {
    pub label: String,
    pub total: Decimal,
    pub count: usize,
    pub mean: Decimal,
    /// Share of all income, in percent
    pub share: Decimal,
}

/// Category total with the main counterparties behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub label: String,
    pub total: Decimal,
    pub count: usize,
    pub counterparties: Vec<String>,
}

/// Counterparties listed per category summary row
pub const SUMMARY_COUNTERPARTIES: usize = 3;

/// All expense records of one category, largest first
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDetail<'a> {
    pub label: String,
    pub total: Decimal,
    pub records: Vec<&'a TransactionRecord>,
}

/// Sum and count per key, biggest total first; ties break on label.
/// Records whose key is `None` are left out.
fn group<'a, I, K>(records: I, key: K, absolute: bool) -> Vec<Slice>
where
    I: Iterator<Item = &'a TransactionRecord>,
    K: Fn(&'a TransactionRecord) -> Option<&'a str>,
{
    let mut groups: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for r in records {
        if let Some(label) = key(r) {
            let entry = groups.entry(label).or_insert((Decimal::ZERO, 0));
            entry.0 += r.amount;
            entry.1 += 1;
        }
    }

    let mut slices: Vec<Slice> = groups
        .into_iter()
        .map(|(label, (total, count))| Slice {
            label: label.to_string(),
            total: if absolute { total.abs() } else { total },
            count,
        })
        .collect();
    slices.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    slices
}

/// Keep the `limit` largest slices and fold the rest into "其他" when non-zero.
/// A kept slice already labelled "其他" absorbs the remainder.
fn fold_tail(mut slices: Vec<Slice>, limit: usize) -> Vec<Slice> {
    if slices.len() <= limit {
        return slices;
    }
    let tail = slices.split_off(limit);
    let total: Decimal = tail.iter().map(|s| s.total).sum();
    if total <= Decimal::ZERO {
        return slices;
    }
    let count: usize = tail.iter().map(|s| s.count).sum();
    match slices.iter_mut().find(|s| s.label == UNCATEGORIZED_LABEL) {
        Some(other) => {
            other.total += total;
            other.count += count;
        }
        None => slices.push(Slice {
            label: UNCATEGORIZED_LABEL.to_string(),
            total,
            count,
        }),
    }
    slices
}

/// First `limit` distinct counterparties, in record order
pub fn distinct_counterparties<'a, I>(records: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut seen: Vec<String> = Vec::new();
    for name in records.into_iter().filter_map(|r| r.counterparty.as_deref()) {
        if seen.len() == limit {
            break;
        }
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Expense totals per category (category, else description, else "其他")
pub fn expense_by_category(dataset: &Dataset, limit: usize) -> Vec<Slice> {
    let slices = group(dataset.expenses(), |r| Some(r.category_label()), true);
    fold_tail(slices, limit)
}

/// Income totals per category
pub fn income_by_category(dataset: &Dataset, limit: usize) -> Vec<Slice> {
    let slices = group(dataset.income(), |r| Some(r.category_label()), false);
    fold_tail(slices, limit)
}

/// Income per category with mean and share of the whole
pub fn income_sources(dataset: &Dataset) -> Vec<IncomeSource> {
    let slices = group(dataset.income(), |r| Some(r.category_label()), false);
    let grand: Decimal = slices.iter().map(|s| s.total).sum();
    let hundred = Decimal::from(100);

    slices
        .into_iter()
        .map(|s| IncomeSource {
            mean: mean(s.total, s.count),
            share: if grand.is_zero() {
                Decimal::ZERO
            } else {
                s.total / grand * hundred
            },
            label: s.label,
            total: s.total,
            count: s.count,
        })
        .collect()
}

/// Absolute totals per payment method across all records
pub fn payment_methods(dataset: &Dataset) -> Vec<Slice> {
    let mut slices = group(dataset.records().iter(), |r| r.payment_method.as_deref(), false);
    for s in &mut slices {
        s.total = s.total.abs();
    }
    slices.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    slices
}

/// Merchants with the largest absolute spend
pub fn top_merchants(dataset: &Dataset, limit: usize) -> Vec<Slice> {
    let mut slices = group(dataset.expenses(), TransactionRecord::merchant_label, true);
    slices.truncate(limit);
    slices
}

/// Largest income descriptions
pub fn top_income_descriptions(dataset: &Dataset, limit: usize) -> Vec<Slice> {
    let mut slices = group(dataset.income(), |r| r.description.as_deref(), false);
    slices.truncate(limit);
    slices
}

/// Largest expense descriptions by absolute spend
pub fn top_expense_descriptions(dataset: &Dataset, limit: usize) -> Vec<Slice> {
    let mut slices = group(dataset.expenses(), |r| r.description.as_deref(), true);
    slices.truncate(limit);
    slices
}

fn category_summary<'a, I>(records: I, limit: usize, absolute: bool) -> Vec<CategorySummary>
where
    I: Iterator<Item = &'a TransactionRecord> + Clone,
{
    let mut slices = group(records.clone(), |r| Some(r.category_label()), absolute);
    slices.truncate(limit);
    slices
        .into_iter()
        .map(|s| CategorySummary {
            counterparties: distinct_counterparties(
                records.clone().filter(|r| r.category_label() == s.label),
                SUMMARY_COUNTERPARTIES,
            ),
            label: s.label,
            total: s.total,
            count: s.count,
        })
        .collect()
}

/// Largest expense categories (absolute totals) with their main merchants
pub fn expense_category_summary(dataset: &Dataset, limit: usize) -> Vec<CategorySummary> {
    category_summary(dataset.expenses(), limit, true)
}

/// Largest income categories with their main payers
pub fn income_category_summary(dataset: &Dataset, limit: usize) -> Vec<CategorySummary> {
    category_summary(dataset.income(), limit, false)
}

/// Expense records grouped by category label (ascending), each sorted by
/// absolute amount descending
pub fn expense_details(dataset: &Dataset) -> Vec<CategoryDetail<'_>> {
    let mut groups: HashMap<&str, Vec<&TransactionRecord>> = HashMap::new();
    for r in dataset.expenses() {
        groups.entry(r.category_label()).or_default().push(r);
    }

    let mut details: Vec<CategoryDetail<'_>> = groups
        .into_iter()
        .map(|(label, mut records)| {
            records.sort_by(|a, b| b.magnitude().cmp(&a.magnitude()));
            CategoryDetail {
                label: label.to_string(),
                total: records.iter().map(|r| r.amount).sum::<Decimal>().abs(),
                records,
            }
        })
        .collect();
    details.sort_by(|a, b| a.label.cmp(&b.label));
    details
}
