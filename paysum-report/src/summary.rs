//! Headline statistics and the monthly summary table.

use std::collections::BTreeMap;

use chrono::Datelike;
use paysum_core::Dataset;
use rust_decimal::Decimal;
use serde::Serialize;

/// Label of the single row shown when there is no monthly data
pub const TOTAL_LABEL: &str = "总计";

/// Whole-dataset totals. Expense figures are absolute values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_income: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub avg_income: Decimal,
    pub avg_expense: Decimal,
}

impl SummaryStats {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let income: Vec<Decimal> = dataset.income().map(|r| r.amount).collect();
        let expense: Vec<Decimal> = dataset.expenses().map(|r| r.amount).collect();

        let total_income: Decimal = income.iter().sum();
        let total_expense = expense.iter().sum::<Decimal>().abs();

        Self {
            total_transactions: dataset.len(),
            total_income,
            total_expense,
            net_income: total_income - total_expense,
            income_count: income.len(),
            expense_count: expense.len(),
            avg_income: mean(total_income, income.len()),
            avg_expense: mean(total_expense, expense.len()),
        }
    }

    /// Income and expense as percentages of their combined total
    pub fn split_percent(&self) -> Option<(Decimal, Decimal)> {
        let whole = self.total_income + self.total_expense;
        if whole <= Decimal::ZERO {
            return None;
        }
        let hundred = Decimal::from(100);
        Some((
            self.total_income / whole * hundred,
            self.total_expense / whole * hundred,
        ))
    }
}

pub(crate) fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// One row of the monthly table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    /// `YYYY-MM`, or "总计" for the fallback row
    pub month: String,
    pub transactions: usize,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Per-month totals in ascending month order.
///
/// An empty dataset yields a single all-zero "总计" row.
pub fn monthly_summary(dataset: &Dataset) -> Vec<MonthlyRow> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        income: Decimal,
        expense: Decimal,
    }

    let mut months: BTreeMap<(i32, u32), Acc> = BTreeMap::new();
    for r in dataset.records() {
        let acc = months
            .entry((r.timestamp.year(), r.timestamp.month()))
            .or_default();
        acc.count += 1;
        if r.is_income() {
            acc.income += r.amount;
        } else if r.is_expense() {
            acc.expense += r.amount;
        }
    }

    if months.is_empty() {
        return vec![MonthlyRow {
            month: TOTAL_LABEL.to_string(),
            transactions: 0,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            net: Decimal::ZERO,
        }];
    }

    months
        .into_iter()
        .map(|((year, month), acc)| {
            let expense = acc.expense.abs();
            MonthlyRow {
                month: format!("{year}-{month:02}"),
                transactions: acc.count,
                income: acc.income,
                expense,
                net: acc.income - expense,
            }
        })
        .collect()
}
