//! Alipay bill export (支付宝交易明细).
//!
//! Both the csv and xlsx exports open with a free-form preamble of varying
//! length, so the header is found by content. Entries outside the income /
//! expense ledger are labelled "不计收支" in 收/支, sometimes with a suffix.

use std::path::Path;

use paysum_core::Source;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::header::{find_header_row, locate_header, DEFAULT_SEARCH_WINDOW};
use crate::parsers::{adapt_table, SourceAdapter};
use crate::table::read_rows;
use crate::types::{AdapterReport, ColumnMap, Field, NeutralRule};

/// Cells that must all appear in the header row
pub const ALIPAY_HEADER_KEYWORDS: [&str; 3] = ["交易时间", "交易分类", "商品说明"];

/// Substring of 收/支 marking neutral entries
pub const ALIPAY_NEUTRAL: NeutralRule = NeutralRule::Contains("不计收支");

pub const ALIPAY_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("交易时间", Field::Timestamp),
    ("交易分类", Field::Category),
    ("交易对方", Field::Counterparty),
    ("商品说明", Field::Description),
    ("收/支", Field::Direction),
    ("金额", Field::Amount),
    ("金额(元)", Field::Amount),
    ("收/付款方式", Field::PaymentMethod),
]);

/// Located-header adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlipayAdapter {
    search_window: usize,
}

impl Default for AlipayAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_WINDOW)
    }
}

impl AlipayAdapter {
    pub fn new(search_window: usize) -> Self {
        Self { search_window }
    }

    /// Adapt rows already read from `path`, locating the header among them
    pub fn adapt_rows(&self, path: &Path, rows: &[Vec<String>]) -> Result<AdapterReport> {
        let header_row = find_header_row(rows, &ALIPAY_HEADER_KEYWORDS, self.search_window)
            .ok_or_else(|| self.header_missing(path))?;
        self.adapt_at(path, rows, header_row)
    }

    fn adapt_at(&self, path: &Path, rows: &[Vec<String>], header_row: usize) -> Result<AdapterReport> {
        adapt_table(
            path,
            &Source::ALIPAY,
            rows,
            header_row,
            &ALIPAY_COLUMNS,
            ALIPAY_NEUTRAL,
        )
    }

    fn header_missing(&self, path: &Path) -> IngestError {
        IngestError::format(
            path,
            format!(
                "no row within the first {} rows contains all of {:?}",
                self.search_window, ALIPAY_HEADER_KEYWORDS
            ),
        )
    }
}

impl SourceAdapter for AlipayAdapter {
    fn source(&self) -> Source {
        Source::ALIPAY
    }

    fn adapt(&self, path: &Path) -> Result<AdapterReport> {
        let header_row = locate_header(path, &ALIPAY_HEADER_KEYWORDS, self.search_window)?;
        info!(path = %path.display(), row = header_row + 1, "found header");

        let rows = read_rows(path, None)?;
        self.adapt_at(path, &rows, header_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paysum_core::Direction;
    use std::fs;

    const HEADER: &str = "交易时间,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态";

    fn write_csv(dir: &Path, name: &str, preamble: &[&str], rows: &[&str]) -> std::path::PathBuf {
        let mut body = String::new();
        for line in preamble {
            body.push_str(line);
            body.push('\n');
        }
        body.push_str(HEADER);
        body.push('\n');
        for line in rows {
            body.push_str(line);
            body.push('\n');
        }
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_header_on_row_three_then_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "支付宝交易明细.csv",
            &["支付宝交易明细", "账号:[someone@example.com]", "起始日期:[2024-01-01 00:00:00]"],
            &[
                "2024-01-03 09:15:00,餐饮美食,早餐店,/,豆浆油条,支出,8.50,花呗,交易成功",
                "2024-01-02 18:00:00,转账红包,张三,/,转账,收入,200.00,余额,交易成功",
            ],
        );

        assert_eq!(locate_header(&path, &ALIPAY_HEADER_KEYWORDS, 30).unwrap(), 3);

        let report = AlipayAdapter::default().adapt(&path).unwrap();
        assert_eq!(report.summary.header_row, 3);
        assert_eq!(report.summary.rows_read, 2);
        assert_eq!(report.records.len(), 2);

        let first = &report.records[0];
        assert_eq!(first.description.as_deref(), Some("豆浆油条"));
        assert_eq!(first.category.as_deref(), Some("餐饮美食"));
        assert_eq!(first.payment_method.as_deref(), Some("花呗"));
        assert_eq!(first.direction, Direction::Expense);
        assert_eq!(first.source, Source::ALIPAY);
        assert_eq!(report.records[1].direction, Direction::Income);
    }

    #[test]
    fn test_neutral_phrase_matched_by_substring() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "支付宝.csv",
            &["支付宝交易明细"],
            &[
                "2024-02-01 10:00:00,投资理财,基金,/,余额宝转入,不计收支,500.00,余额,交易成功",
                "2024-02-01 11:00:00,退款,商店,/,退款,不计收支(退款),20.00,余额,退款成功",
                "2024-02-01 12:00:00,餐饮美食,面馆,/,午饭,支出,25.00,余额,交易成功",
            ],
        );

        let report = AlipayAdapter::default().adapt(&path).unwrap();
        assert_eq!(report.summary.neutral_dropped, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].direction, Direction::Expense);
    }

    #[test]
    fn test_unlabelled_rows_never_become_income() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "支付宝.csv",
            &["支付宝交易明细"],
            &[
                "2024-02-01 12:00:00,餐饮美食,面馆,/,午饭,支出,25.00,余额,交易成功",
                "2024-02-01 13:00:00,其他,某人,/,转账,/,300.00,余额,交易成功",
                "2024-02-01 14:00:00,其他,某人,/,转账,,400.00,余额,交易关闭",
            ],
        );

        let report = AlipayAdapter::default().adapt(&path).unwrap();
        assert_eq!(report.summary.rows_read, 3);
        assert_eq!(report.summary.neutral_dropped, 2);
        assert_eq!(report.summary.invalid_dropped, 0);
        assert_eq!(report.records.len(), 1);
        assert!(report.records.iter().all(|r| !r.is_income()));
    }

    #[test]
    fn test_amount_sign_decides_without_direction_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("支付宝.csv");
        fs::write(
            &path,
            "交易时间,交易分类,商品说明,金额\n2024-02-01 12:00:00,餐饮美食,午饭,-25.00\n2024-02-02 09:00:00,转账红包,红包,66.00\n",
        )
        .unwrap();

        let report = AlipayAdapter::default().adapt(&path).unwrap();
        let dirs: Vec<_> = report.records.iter().map(|r| r.direction).collect();
        assert_eq!(dirs, vec![Direction::Expense, Direction::Income]);
    }

    #[test]
    fn test_trailing_footer_rows_are_dropped_as_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "支付宝.csv",
            &[],
            &[
                "2024-02-01 12:00:00,餐饮美食,面馆,/,午饭,支出,25.00,余额,交易成功",
                "------------------------------------------------------------------------------------",
                "导出时间:[2024-03-01 10:00:00]",
            ],
        );

        let report = AlipayAdapter::default().adapt(&path).unwrap();
        assert_eq!(report.summary.header_row, 0);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.summary.invalid_dropped, 2);
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("支付宝.csv");
        fs::write(&path, "交易时间,金额\n2024-01-01 10:00:00,1.00\n").unwrap();

        let err = AlipayAdapter::default().adapt(&path).unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }

    #[test]
    fn test_adapt_rows_locates_header_in_memory() {
        let rows: Vec<Vec<String>> = vec![
            vec!["支付宝交易明细".into()],
            vec![],
            ["交易时间", "交易分类", "商品说明", "收/支", "金额"].iter().map(|s| s.to_string()).collect(),
            ["2024-05-01 08:00:00", "交通出行", "地铁", "支出", "4.00"].iter().map(|s| s.to_string()).collect(),
        ];
        let report = AlipayAdapter::default()
            .adapt_rows(Path::new("支付宝.xlsx"), &rows)
            .unwrap();
        assert_eq!(report.summary.header_row, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].counterparty, None);
    }
}
