use std::fs;
use std::path::Path;

use paysum_core::Source;
use paysum_ingest::{DatasetMerger, DirectoryDiscovery, FileOutcome, IngestError};

const HEADER: &str = "交易时间,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态";

fn write_alipay(dir: &Path, name: &str, rows: &[&str]) {
    let mut body = String::from("支付宝交易明细\n账号:[someone@example.com]\n");
    body.push_str(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body.push_str("------------------------------------\n");
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn merges_directory_and_skips_broken_export() {
    let dir = tempfile::tempdir().unwrap();
    write_alipay(
        dir.path(),
        "支付宝_2024_01.csv",
        &[
            "2024-01-20 12:00:00,餐饮美食,面馆,/,午饭,支出,25.00,余额,交易成功",
            "2024-01-05 09:00:00,投资理财,基金,/,余额宝转入,不计收支,500.00,余额,交易成功",
        ],
    );
    write_alipay(
        dir.path(),
        "支付宝_2024_02.csv",
        &[
            "2024-02-01 08:30:00,转账红包,张三,/,转账,收入,\"¥1,200.00\",余额,交易成功",
            "2024-01-20 12:00:00,交通出行,地铁,/,地铁,支出,4.00,花呗,交易成功",
        ],
    );
    fs::write(dir.path().join("微信支付账单(20240101-20240131).xlsx"), b"not a workbook").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let report = DatasetMerger::with_default_adapters(DirectoryDiscovery::with_default_patterns(dir.path()))
        .merge()
        .unwrap();

    assert_eq!(report.files.len(), 3);
    assert!(matches!(
        &report.files[0],
        FileOutcome::Skipped { source, .. } if *source == Source::WECHAT
    ));
    assert_eq!(report.skipped().count(), 1);

    let records = report.dataset.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].amount.to_string(), "1200.00");
    // equal timestamps keep file order
    assert_eq!(records[1].description.as_deref(), Some("午饭"));
    assert_eq!(records[2].description.as_deref(), Some("地铁"));
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    assert_eq!(report.rows_by_source().get(&Source::ALIPAY), Some(&3));
}

#[test]
fn empty_directory_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let err = DatasetMerger::with_default_adapters(DirectoryDiscovery::with_default_patterns(dir.path()))
        .merge()
        .unwrap_err();
    assert!(matches!(err, IngestError::NoData { files_found: 0 }));
}

#[test]
fn only_broken_exports_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("微信支付账单.xlsx"), b"garbage").unwrap();
    fs::write(dir.path().join("支付宝.csv"), "no header here\n1,2,3\n").unwrap();

    let err = DatasetMerger::with_default_adapters(DirectoryDiscovery::with_default_patterns(dir.path()))
        .merge()
        .unwrap_err();
    assert!(err.is_no_data());
    assert!(matches!(err, IngestError::NoData { files_found: 2 }));
}
