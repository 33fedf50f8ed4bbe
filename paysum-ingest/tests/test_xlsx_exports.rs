use std::path::Path;

use chrono::NaiveDate;
use paysum_core::{Direction, Source};
use paysum_ingest::table::read_rows;
use paysum_ingest::{locate_header, AlipayAdapter, SourceAdapter, WechatAdapter, ALIPAY_HEADER_KEYWORDS};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

const WECHAT_HEADER: [&str; 8] = ["交易时间", "交易类型", "交易对方", "商品", "收/支", "金额(元)", "支付方式", "当前状态"];
const ALIPAY_HEADER: [&str; 8] = ["交易时间", "交易分类", "交易对方", "商品说明", "收/支", "金额", "收/付款方式", "交易状态"];

fn write_row(sheet: &mut rust_xlsxwriter::Worksheet, row: u32, first_col: u16, cells: &[&str]) {
    for (i, cell) in cells.iter().enumerate() {
        sheet.write_string(row, first_col + i as u16, *cell).unwrap();
    }
}

/// Preamble starting below empty rows, header on row 16, one date-typed
/// timestamp, one neutral row
fn write_wechat_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let sheet = workbook.add_worksheet();

    write_row(sheet, 4, 0, &["微信支付账单明细"]);
    write_row(sheet, 6, 0, &["微信昵称：[someone]"]);
    write_row(sheet, 16, 0, &WECHAT_HEADER);

    let when = ExcelDateTime::parse_from_str("2024-04-01 12:30:00").unwrap();
    sheet.write_datetime_with_format(17, 0, &when, &date_format).unwrap();
    write_row(sheet, 17, 1, &["商户消费", "便利店", "饮料", "支出", "¥6.50", "零钱", "支付成功"]);
    write_row(sheet, 18, 0, &["2024-04-02 08:00:00", "零钱提现", "银行卡", "/", "/", "¥100.00", "零钱", "提现已到账"]);
    write_row(sheet, 19, 0, &["2024-04-03 09:15:00", "转账", "张三", "/", "收入", "¥50.00", "/", "已收钱"]);

    workbook.save(path).unwrap();
}

#[test]
fn wechat_workbook_header_lands_on_row_sixteen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("微信支付账单(20240401-20240430).xlsx");
    write_wechat_workbook(&path);

    let rows = read_rows(&path, None).unwrap();
    assert_eq!(rows.len(), 20);
    assert!(rows[0].is_empty());
    assert_eq!(rows[16][0], "交易时间");

    let report = WechatAdapter::default().adapt(&path).unwrap();
    assert_eq!(report.summary.header_row, 16);
    assert_eq!(report.summary.rows_read, 3);
    assert_eq!(report.summary.neutral_dropped, 1);
    assert_eq!(report.summary.invalid_dropped, 0);
    assert_eq!(report.records.len(), 2);

    let coffee = &report.records[0];
    let expected = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(12, 30, 0).unwrap();
    assert_eq!(coffee.timestamp, expected);
    assert_eq!(coffee.direction, Direction::Expense);
    assert_eq!(coffee.counterparty.as_deref(), Some("便利店"));
    assert_eq!(coffee.source, Source::WECHAT);
    assert_eq!(report.records[1].direction, Direction::Income);
}

#[test]
fn alipay_workbook_header_off_column_a() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("支付宝交易明细.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_row(sheet, 2, 2, &["支付宝交易明细"]);
    write_row(sheet, 3, 2, &["账号:[someone@example.com]"]);
    write_row(sheet, 5, 2, &ALIPAY_HEADER);
    write_row(sheet, 6, 2, &["2024-05-01 18:20:00", "餐饮美食", "面馆", "牛肉面", "支出", "28.00", "花呗", "交易成功"]);
    write_row(sheet, 7, 2, &["2024-05-02 10:00:00", "投资理财", "基金", "余额宝转入", "不计收支", "500.00", "余额", "交易成功"]);
    workbook.save(&path).unwrap();

    assert_eq!(locate_header(&path, &ALIPAY_HEADER_KEYWORDS, 30).unwrap(), 5);

    let report = AlipayAdapter::default().adapt(&path).unwrap();
    assert_eq!(report.summary.header_row, 5);
    assert_eq!(report.summary.neutral_dropped, 1);
    assert_eq!(report.records.len(), 1);

    let noodles = &report.records[0];
    assert_eq!(noodles.description.as_deref(), Some("牛肉面"));
    assert_eq!(noodles.category.as_deref(), Some("餐饮美食"));
    assert_eq!(noodles.payment_method.as_deref(), Some("花呗"));
    assert_eq!(noodles.amount.to_string(), "28.00");
    assert_eq!(
        noodles.timestamp,
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(18, 20, 0).unwrap()
    );
}
