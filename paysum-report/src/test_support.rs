use std::str::FromStr;

use paysum_core::{parse_timestamp, Direction, Source, TransactionRecord};
use rust_decimal::Decimal;

pub fn record(ts: &str, amount: &str, category: &str, direction: Direction) -> TransactionRecord {
    TransactionRecord {
        timestamp: parse_timestamp(ts).unwrap(),
        category: Some(category.to_string()),
        counterparty: None,
        description: Some(format!("{category}相关交易")),
        direction,
        amount: Decimal::from_str(amount).unwrap(),
        payment_method: None,
        source: Source::SAMPLE,
    }
}

pub fn income(ts: &str, amount: &str, category: &str) -> TransactionRecord {
    record(ts, amount, category, Direction::Income)
}

pub fn expense(ts: &str, amount: &str, category: &str) -> TransactionRecord {
    record(ts, amount, category, Direction::Expense)
}

pub fn with_merchant(mut r: TransactionRecord, merchant: &str) -> TransactionRecord {
    r.counterparty = Some(merchant.to_string());
    r
}

pub fn with_payment(mut r: TransactionRecord, method: &str) -> TransactionRecord {
    r.payment_method = Some(method.to_string());
    r
}
