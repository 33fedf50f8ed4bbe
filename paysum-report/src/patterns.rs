//! Time-pattern analyses: weekly trend, weekday and hour-of-day spending.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use paysum_core::Dataset;
use rust_decimal::Decimal;
use serde::Serialize;

pub const WEEKDAY_LABELS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Income and expense of one Monday-to-Sunday week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    /// Monday of the week
    pub week_start: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Spend bucket for a weekday or an hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendBucket {
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayPattern {
    /// Monday first
    pub days: [SpendBucket; 7],
    /// Mean daily total over Monday..Friday
    pub weekday_average: Decimal,
    /// Mean daily total over Saturday and Sunday
    pub weekend_average: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPattern {
    /// Only hours with spending, ascending
    pub hours: Vec<(u32, SpendBucket)>,
    /// Hour with the largest total; the earliest hour wins ties
    pub peak: Option<(u32, Decimal)>,
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Weekly income/expense from the first to the last active week, gaps filled with zero
pub fn weekly_trend(dataset: &Dataset) -> Vec<WeekRow> {
    let mut weeks: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for r in dataset.records() {
        let entry = weeks
            .entry(week_start(r.timestamp.date()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if r.is_income() {
            entry.0 += r.amount;
        } else if r.is_expense() {
            entry.1 += r.amount;
        }
    }

    let (Some(first), Some(last)) = (weeks.keys().next().copied(), weeks.keys().last().copied()) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    let mut week = first;
    while week <= last {
        let (income, expense) = weeks.get(&week).copied().unwrap_or_default();
        rows.push(WeekRow {
            week_start: week,
            income,
            expense: expense.abs(),
        });
        week += Duration::days(7);
    }
    rows
}

/// Expense per weekday
pub fn weekday_pattern(dataset: &Dataset) -> WeekdayPattern {
    let mut days: [SpendBucket; 7] = std::array::from_fn(|_| SpendBucket {
        total: Decimal::ZERO,
        count: 0,
    });
    let mut signed = [Decimal::ZERO; 7];

    for r in dataset.expenses() {
        let idx = r.timestamp.weekday().num_days_from_monday() as usize;
        signed[idx] += r.amount;
        days[idx].count += 1;
    }
    for (bucket, total) in days.iter_mut().zip(signed) {
        bucket.total = total.abs();
    }

    let weekday_sum: Decimal = days[..5].iter().map(|d| d.total).sum();
    let weekend_sum: Decimal = days[5..].iter().map(|d| d.total).sum();

    WeekdayPattern {
        weekday_average: weekday_sum / Decimal::from(5),
        weekend_average: weekend_sum / Decimal::from(2),
        days,
    }
}

/// Expense per hour of day
pub fn hourly_pattern(dataset: &Dataset) -> HourlyPattern {
    let mut hours: BTreeMap<u32, (Decimal, usize)> = BTreeMap::new();
    for r in dataset.expenses() {
        let entry = hours.entry(r.timestamp.hour()).or_insert((Decimal::ZERO, 0));
        entry.0 += r.amount;
        entry.1 += 1;
    }

    let hours: Vec<(u32, SpendBucket)> = hours
        .into_iter()
        .map(|(h, (total, count))| (h, SpendBucket { total: total.abs(), count }))
        .collect();

    let mut peak: Option<(u32, Decimal)> = None;
    for (h, bucket) in &hours {
        if peak.is_none_or(|(_, best)| bucket.total > best) {
            peak = Some((*h, bucket.total));
        }
    }

    HourlyPattern { hours, peak }
}

/// Chinese label for a weekday
pub fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_LABELS[day.num_days_from_monday() as usize]
}
