//! Synthetic demonstration data, used when no export could be read.

use chrono::{Duration, NaiveDate, NaiveTime};
use paysum_core::{Dataset, Direction, Source, TransactionRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

pub const SAMPLE_RECORDS: usize = 200;
pub const SAMPLE_SEED: u64 = 42;

const INCOME_CATEGORIES: &[&str] = &["工资", "奖金", "投资收益", "兼职收入", "其他收入"];
const EXPENSE_CATEGORIES: &[&str] = &["餐饮", "交通", "购物", "娱乐", "房租", "水电费", "医疗", "教育"];
const PAYMENT_METHODS: &[&str] = &["支付宝", "微信支付", "银行卡", "现金", "信用卡"];

/// `count` random records dated within 2024, half income and half expense on
/// average. The same seed always yields the same dataset.
pub fn sample_dataset(count: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();

    let records = (0..count)
        .map(|_| {
            let day = start + Duration::days(rng.gen_range(0..=365));
            let time = NaiveTime::from_hms_opt(rng.gen_range(7..=22), rng.gen_range(0..60), 0)
                .unwrap_or(NaiveTime::MIN);

            let (direction, category, amount) = if rng.gen_bool(0.5) {
                (
                    Direction::Income,
                    pick(&mut rng, INCOME_CATEGORIES),
                    Decimal::from(rng.gen_range(3000..=15000i64)),
                )
            } else {
                (
                    Direction::Expense,
                    pick(&mut rng, EXPENSE_CATEGORIES),
                    -Decimal::from(rng.gen_range(50..=2000i64)),
                )
            };

            TransactionRecord {
                timestamp: day.and_time(time),
                category: Some(category.to_string()),
                counterparty: None,
                description: Some(format!("{category}相关交易")),
                direction,
                amount,
                payment_method: Some(pick(&mut rng, PAYMENT_METHODS).to_string()),
                source: Source::SAMPLE,
            }
        })
        .collect();

    Dataset::new(records)
}

fn pick(rng: &mut StdRng, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or("")
}
