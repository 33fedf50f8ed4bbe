//! WeChat Pay bill export (微信支付账单).
//!
//! The xlsx export carries 16 rows of account preamble; the column header is
//! always on row 17:
//!   交易时间 | 交易类型 | 交易对方 | 商品 | 收/支 | 金额(元) | 支付方式 | 当前状态 | ...
//! Transfers and other non-financial entries carry "/" in 收/支.

use std::path::Path;

use paysum_core::Source;

use crate::error::{IngestError, Result};
use crate::parsers::{adapt_table, SourceAdapter};
use crate::table::{read_rows, TableFormat};
use crate::types::{AdapterReport, ColumnMap, Field, NeutralRule};

/// 0-based row index of the header in every WeChat export
pub const WECHAT_HEADER_ROW: usize = 16;

/// Exact 收/支 value of neutral entries
pub const WECHAT_NEUTRAL: NeutralRule = NeutralRule::Exact("/");

pub const WECHAT_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("交易时间", Field::Timestamp),
    ("交易类型", Field::Category),
    ("交易对方", Field::Counterparty),
    ("商品", Field::Description),
    ("收/支", Field::Direction),
    ("金额(元)", Field::Amount),
    ("金额", Field::Amount),
    ("支付方式", Field::PaymentMethod),
]);

/// Fixed-offset adapter: no header search, the layout is fixed by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WechatAdapter {
    header_row: usize,
}

impl Default for WechatAdapter {
    fn default() -> Self {
        Self::new(WECHAT_HEADER_ROW)
    }
}

impl WechatAdapter {
    pub fn new(header_row: usize) -> Self {
        Self { header_row }
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Adapt rows already read from `path`
    pub fn adapt_rows(&self, path: &Path, rows: &[Vec<String>]) -> Result<AdapterReport> {
        adapt_table(
            path,
            &Source::WECHAT,
            rows,
            self.header_row,
            &WECHAT_COLUMNS,
            WECHAT_NEUTRAL,
        )
    }
}

impl SourceAdapter for WechatAdapter {
    fn source(&self) -> Source {
        Source::WECHAT
    }

    fn adapt(&self, path: &Path) -> Result<AdapterReport> {
        if TableFormat::from_path(path)? != TableFormat::Xlsx {
            return Err(IngestError::format(path, "WeChat exports are read from .xlsx only"));
        }
        let rows = read_rows(path, None)?;
        self.adapt_rows(path, &rows)
    }
}
