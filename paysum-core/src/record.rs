//! Canonical transaction record shared by every export adapter

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Fallback category label when a record carries neither category nor description
pub const UNCATEGORIZED_LABEL: &str = "其他";
/// Fallback label for missing text fields
pub const UNKNOWN_LABEL: &str = "未知";

/// Money flow of a transaction, taken from the platform's 收/支 column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "neutral")]
    Neutral,
}

impl Direction {
    /// Label both platforms use for this flow
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Income => "收入",
            Direction::Expense => "支出",
            Direction::Neutral => "不计收支",
        }
    }

    /// Classify a raw label. `None` when it names neither income nor expense.
    ///
    /// Neutral markers are platform specific and are recognised by the
    /// adapters, not here.
    pub fn from_label(label: &str) -> Option<Direction> {
        if label.contains("收入") {
            Some(Direction::Income)
        } else if label.contains("支出") {
            Some(Direction::Expense)
        } else {
            None
        }
    }

    /// Direction implied by the sign of an amount (negative = expense)
    pub fn from_amount(amount: Decimal) -> Direction {
        if amount < Decimal::ZERO {
            Direction::Expense
        } else {
            Direction::Income
        }
    }
}

/// Identity of the export a record came from.
///
/// Not a closed enum: a new platform needs an adapter and an id, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Source(Cow<'static, str>);

impl Source {
    /// WeChat Pay bill export (fixed header offset, xlsx)
    pub const WECHAT: Source = Source(Cow::Borrowed("wechat"));
    /// Alipay bill export (located header, csv or xlsx)
    pub const ALIPAY: Source = Source(Cow::Borrowed("alipay"));
    /// Synthetic demonstration data
    pub const SAMPLE: Source = Source(Cow::Borrowed("sample"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Source(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated transaction.
///
/// `timestamp` and `amount` are always present; every other text field
/// depends on what the source export provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: NaiveDateTime,
    /// Platform-specific classification (交易类型 / 交易分类)
    pub category: Option<String>,
    /// Merchant or payer
    pub counterparty: Option<String>,
    /// Item or service description
    pub description: Option<String>,
    pub direction: Direction,
    /// Signed amount as exported. Sign conventions differ per platform.
    pub amount: Decimal,
    /// Settlement channel (card, balance, ...)
    pub payment_method: Option<String>,
    pub source: Source,
}

impl TransactionRecord {
    pub fn is_income(&self) -> bool {
        self.direction == Direction::Income
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Expense
    }

    /// Unsigned amount, used for expense totals
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    /// Category, else description, else "其他"
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or(UNCATEGORIZED_LABEL)
    }

    /// Counterparty only; records without one are left out of merchant rankings
    pub fn merchant_label(&self) -> Option<&str> {
        self.counterparty.as_deref()
    }

    /// Description, else "未知"
    pub fn description_label(&self) -> &str {
        self.description.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Payment method, else "未知"
    pub fn payment_label(&self) -> &str {
        self.payment_method.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(category: Option<&str>, description: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            category: category.map(str::to_string),
            counterparty: None,
            description: description.map(str::to_string),
            direction: Direction::Expense,
            amount: Decimal::from_str("-12.50").unwrap(),
            payment_method: None,
            source: Source::WECHAT,
        }
    }

    #[test]
    fn test_direction_from_label() {
        assert_eq!(Direction::from_label("收入"), Some(Direction::Income));
        assert_eq!(Direction::from_label(" 支出 "), Some(Direction::Expense));
        assert_eq!(Direction::from_label("不计收支"), None);
        assert_eq!(Direction::from_label("/"), None);
    }

    #[test]
    fn test_direction_from_amount() {
        assert_eq!(Direction::from_amount(Decimal::from(-3)), Direction::Expense);
        assert_eq!(Direction::from_amount(Decimal::ZERO), Direction::Income);
        assert_eq!(Direction::from_amount(Decimal::from(8)), Direction::Income);
    }

    #[test]
    fn test_label_fallback_order() {
        assert_eq!(record(Some("餐饮"), Some("午饭")).category_label(), "餐饮");
        assert_eq!(record(None, Some("午饭")).category_label(), "午饭");
        assert_eq!(record(None, None).category_label(), UNCATEGORIZED_LABEL);
        assert_eq!(record(None, None).description_label(), UNKNOWN_LABEL);
        assert_eq!(record(None, None).payment_label(), UNKNOWN_LABEL);
        assert_eq!(record(None, None).merchant_label(), None);
    }

    #[test]
    fn test_source_serializes_as_plain_id() {
        let json = serde_json::to_string(&Source::ALIPAY).unwrap();
        assert_eq!(json, "\"alipay\"");
        let back: Source = serde_json::from_str("\"bank\"").unwrap();
        assert_eq!(back, Source::new("bank"));
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(record(None, None).magnitude(), Decimal::from_str("12.50").unwrap());
    }
}
