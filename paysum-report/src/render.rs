//! Report assembly and rendering.
//!
//! The dataset is turned into pages of titled tables once; the terminal and
//! the exported document render the same pages with different table presets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL_CONDENSED};
use comfy_table::{ContentArrangement, Table};
use paysum_core::Dataset;
use rust_decimal::Decimal;
use tracing::info;

use crate::breakdown::{
    expense_by_category, expense_category_summary, expense_details, income_by_category,
    income_category_summary, income_sources, payment_methods, top_expense_descriptions,
    top_income_descriptions, top_merchants, CategorySummary, Slice,
};
use crate::patterns::{hourly_pattern, weekday_pattern, weekly_trend, WEEKDAY_LABELS};
use crate::summary::{monthly_summary, SummaryStats, TOTAL_LABEL};

const NO_DATA: &str = "暂无数据";
const DOCUMENT_EXTENSION: &str = "md";
const PAGE_BREAK: &str = "\n---\n\n";
/// Rows in each category summary on the detail page
const SUMMARY_CATEGORIES: usize = 10;

/// Knobs for what the report includes and where documents go
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub top_merchants: usize,
    pub category_slices: usize,
    pub top_descriptions: usize,
    /// Directory for exported documents; relative destinations resolve here
    pub output_dir: PathBuf,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_merchants: 10,
            category_slices: 8,
            top_descriptions: 5,
            output_dir: PathBuf::from("."),
        }
    }
}

/// A titled table with optional notes below it
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub notes: Vec<String>,
}

impl Section {
    fn new(title: impl Into<String>, header: &[&str]) -> Self {
        Self {
            title: title.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    fn rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Consumer of the merged dataset
pub trait ReportRenderer {
    /// Show the report interactively
    fn display(&self, dataset: &Dataset) -> Result<()>;

    /// Write the report document and return where it went.
    /// `None` picks a timestamped default name.
    fn export(&self, dataset: &Dataset, destination: Option<&Path>) -> Result<PathBuf>;
}

pub(crate) fn money(d: Decimal) -> String {
    format!("¥{d:.2}")
}

fn percent(d: Decimal) -> String {
    format!("{d:.1}%")
}

fn slice_rows(slices: &[Slice]) -> impl Iterator<Item = Vec<String>> + '_ {
    slices
        .iter()
        .map(|s| vec![s.label.clone(), money(s.total), format!("{}笔", s.count)])
}

/// Assemble the report pages: overview, breakdowns and patterns, expense detail
pub fn build_pages(dataset: &Dataset, options: &ReportOptions) -> Vec<Page> {
    vec![
        overview_page(dataset),
        breakdown_page(dataset, options),
        detail_page(dataset),
    ]
}

fn overview_page(dataset: &Dataset) -> Page {
    let stats = SummaryStats::from_dataset(dataset);

    let summary = Section::new("财务数据统计摘要", &["统计项目", "数值"]).rows([
        vec!["总交易笔数".into(), format!("{}笔", stats.total_transactions)],
        vec!["总收入".into(), money(stats.total_income)],
        vec!["总支出".into(), money(stats.total_expense)],
        vec!["净收入".into(), money(stats.net_income)],
        vec!["收入笔数".into(), format!("{}笔", stats.income_count)],
        vec!["支出笔数".into(), format!("{}笔", stats.expense_count)],
        vec!["平均收入".into(), money(stats.avg_income)],
        vec!["平均支出".into(), money(stats.avg_expense)],
    ]);

    let mut split = Section::new("整体收支比例", &["类型", "金额", "占比"]);
    if let Some((inc, exp)) = stats.split_percent() {
        split = split
            .row(vec!["收入".into(), money(stats.total_income), percent(inc)])
            .row(vec!["支出".into(), money(stats.total_expense), percent(exp)]);
    }

    let monthly = Section::new("月度财务统计摘要", &["月份", "交易笔数", "总收入", "总支出", "净收入"])
        .rows(monthly_summary(dataset).into_iter().map(|m| {
            vec![
                m.month,
                format!("{}笔", m.transactions),
                money(m.income),
                money(m.expense),
                money(m.net),
            ]
        }));

    let weekly = Section::new("周度收入支出趋势", &["周次", "起始日期", "收入", "支出"]).rows(
        weekly_trend(dataset).into_iter().enumerate().map(|(i, w)| {
            vec![
                format!("第{}周", i + 1),
                w.week_start.format("%Y-%m-%d").to_string(),
                money(w.income),
                money(w.expense),
            ]
        }),
    );

    let sources = Section::new("数据来源", &["数据源", "行数"]).rows(
        dataset
            .count_by_source()
            .into_iter()
            .map(|(source, n)| vec![source.to_string(), n.to_string()]),
    );

    Page {
        title: "个人财务分析报告 - 概览".to_string(),
        sections: vec![summary, split, monthly, weekly, sources],
    }
}

fn breakdown_page(dataset: &Dataset, options: &ReportOptions) -> Page {
    let expense_categories = Section::new("支出品类分布", &["分类", "金额", "笔数"])
        .rows(slice_rows(&expense_by_category(dataset, options.category_slices)).collect::<Vec<_>>());

    let income_categories = Section::new("收入来源分布", &["分类", "金额", "笔数"])
        .rows(slice_rows(&income_by_category(dataset, options.category_slices)).collect::<Vec<_>>());

    let sources = income_sources(dataset);
    let mut income_analysis = Section::new(
        "收入来源详细分析",
        &["收入类型", "总金额", "交易次数", "平均金额", "占比"],
    )
    .rows(sources.iter().map(|s| {
        vec![
            s.label.clone(),
            money(s.total),
            format!("{}笔", s.count),
            money(s.mean),
            percent(s.share),
        ]
    }));
    if !sources.is_empty() {
        let total: Decimal = sources.iter().map(|s| s.total).sum();
        let count: usize = sources.iter().map(|s| s.count).sum();
        let mean_of_totals = total / Decimal::from(sources.len());
        income_analysis = income_analysis.row(vec![
            TOTAL_LABEL.to_string(),
            money(total),
            format!("{count}笔"),
            money(mean_of_totals),
            "100.0%".to_string(),
        ]);
    }

    let methods = Section::new("支付方式统计", &["支付方式", "金额"]).rows(
        payment_methods(dataset)
            .into_iter()
            .map(|s| vec![s.label, money(s.total)]),
    );

    let merchants = Section::new(
        format!("主要消费商户分析 (TOP{})", options.top_merchants),
        &["商户", "金额", "次数"],
    )
    .rows(slice_rows(&top_merchants(dataset, options.top_merchants)).collect::<Vec<_>>());

    let top_income = Section::new(format!("收入分类 TOP{}", options.top_descriptions), &["商品说明", "金额"])
        .rows(
            top_income_descriptions(dataset, options.top_descriptions)
                .into_iter()
                .map(|s| vec![s.label, money(s.total)]),
        );

    let top_expense = Section::new(format!("支出分类 TOP{}", options.top_descriptions), &["商品说明", "金额"])
        .rows(
            top_expense_descriptions(dataset, options.top_descriptions)
                .into_iter()
                .map(|s| vec![s.label, money(s.total)]),
        );

    let weekday = weekday_pattern(dataset);
    let mut weekly_habits = Section::new("一周消费习惯分析", &["星期", "消费金额", "笔数"]);
    if dataset.expenses().next().is_some() {
        weekly_habits = weekly_habits
            .rows(weekday.days.iter().zip(WEEKDAY_LABELS).map(|(d, label)| {
                vec![label.to_string(), money(d.total), format!("{}笔", d.count)]
            }))
            .note(format!("工作日均值: {}", money(weekday.weekday_average)))
            .note(format!("周末均值: {}", money(weekday.weekend_average)));
    }

    let hourly = hourly_pattern(dataset);
    let mut hourly_habits = Section::new("一天消费时段分析", &["小时", "消费金额", "笔数"]).rows(
        hourly
            .hours
            .iter()
            .map(|(h, b)| vec![format!("{h}时"), money(b.total), format!("{}笔", b.count)]),
    );
    if let Some((hour, total)) = hourly.peak {
        hourly_habits = hourly_habits.note(format!("峰值: {hour}时 {}", money(total)));
    }

    Page {
        title: "个人财务分析报告 - 分类与消费习惯".to_string(),
        sections: vec![
            expense_categories,
            income_categories,
            income_analysis,
            methods,
            merchants,
            top_income,
            top_expense,
            weekly_habits,
            hourly_habits,
        ],
    }
}

fn summary_section(title: &str, party_header: &str, rows: Vec<CategorySummary>) -> Section {
    Section::new(title, &["分类", "总金额", "交易次数", party_header]).rows(rows.into_iter().map(|c| {
        vec![
            c.label,
            money(c.total),
            format!("{}笔", c.count),
            c.counterparties.join(", "),
        ]
    }))
}

fn detail_page(dataset: &Dataset) -> Page {
    let mut sections = vec![
        summary_section(
            &format!("支出分类汇总 (前{SUMMARY_CATEGORIES}项)"),
            "主要商户",
            expense_category_summary(dataset, SUMMARY_CATEGORIES),
        ),
        summary_section(
            &format!("收入来源汇总 (前{SUMMARY_CATEGORIES}项)"),
            "主要来源",
            income_category_summary(dataset, SUMMARY_CATEGORIES),
        ),
    ];

    let details = expense_details(dataset)
        .into_iter()
        .map(|detail| {
            let title = format!(
                "{} - 总金额: {} | 交易笔数: {}笔",
                detail.label,
                money(detail.total),
                detail.records.len()
            );
            Section::new(title, &["商品说明", "金额(元)", "交易时间", "支付方式"]).rows(
                detail.records.iter().map(|r| {
                    vec![
                        r.description_label().to_string(),
                        format!("{:.2}", r.magnitude()),
                        r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        r.payment_label().to_string(),
                    ]
                }),
            )
        });
    sections.extend(details);

    Page {
        title: "个人财务分析报告 - 收支明细".to_string(),
        sections,
    }
}

/// Renders to the terminal and exports Markdown documents
#[derive(Debug, Clone, Default)]
pub struct TerminalRenderer {
    options: ReportOptions,
}

impl TerminalRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Plain-text rendering used by `display`
    pub fn render_text(&self, dataset: &Dataset) -> String {
        let mut out = String::new();
        for page in build_pages(dataset, &self.options) {
            let rule = "=".repeat(50);
            out.push_str(&format!("{rule}\n{}\n{rule}\n\n", page.title));
            if page.sections.is_empty() {
                out.push_str(&format!("{NO_DATA}\n\n"));
            }
            for section in &page.sections {
                out.push_str(&format!("{}\n", section.title));
                if section.rows.is_empty() {
                    out.push_str(&format!("  {NO_DATA}\n"));
                } else {
                    let table = make_table(section, false);
                    out.push_str(&format!("{table}\n"));
                }
                for note in &section.notes {
                    out.push_str(&format!("  {note}\n"));
                }
                out.push('\n');
            }
        }
        out
    }

    /// Markdown document rendering used by `export`; pages are separated by
    /// horizontal rules
    pub fn render_markdown(&self, dataset: &Dataset) -> String {
        let pages: Vec<String> = build_pages(dataset, &self.options)
            .into_iter()
            .map(|page| {
                let mut out = format!("# {}\n\n", page.title);
                if page.sections.is_empty() {
                    out.push_str(&format!("{NO_DATA}\n\n"));
                }
                for section in &page.sections {
                    out.push_str(&format!("## {}\n\n", section.title));
                    if section.rows.is_empty() {
                        out.push_str(&format!("{NO_DATA}\n\n"));
                    } else {
                        out.push_str(&format!("{}\n\n", make_table(section, true)));
                    }
                    for note in &section.notes {
                        out.push_str(&format!("- {note}\n"));
                    }
                    if !section.notes.is_empty() {
                        out.push('\n');
                    }
                }
                out
            })
            .collect();
        pages.join(PAGE_BREAK)
    }

    fn export_path(&self, destination: Option<&Path>) -> PathBuf {
        match destination {
            None => self
                .options
                .output_dir
                .join(default_document_name(Local::now().naive_local())),
            Some(dest) => self.options.output_dir.join(with_document_extension(dest)),
        }
    }
}

impl ReportRenderer for TerminalRenderer {
    fn display(&self, dataset: &Dataset) -> Result<()> {
        print!("{}", self.render_text(dataset));
        Ok(())
    }

    fn export(&self, dataset: &Dataset, destination: Option<&Path>) -> Result<PathBuf> {
        let path = self.export_path(destination);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, self.render_markdown(dataset))
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), records = dataset.len(), "exported report");
        Ok(path)
    }
}

fn make_table(section: &Section, markdown: bool) -> Table {
    let mut table = Table::new();
    if markdown {
        table.load_preset(ASCII_MARKDOWN);
        table.set_content_arrangement(ContentArrangement::Disabled);
    } else {
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
    }
    let cells = |row: &[String]| -> Vec<String> {
        if markdown {
            row.iter().map(|c| escape_markdown_cell(c)).collect()
        } else {
            row.to_vec()
        }
    };
    table.set_header(cells(&section.header));
    for row in &section.rows {
        table.add_row(cells(row));
    }
    table
}

/// A bare `|` would end the cell early
fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// `财务分析报告_<YYYYmmdd_HHMMSS>.md`
pub fn default_document_name(now: NaiveDateTime) -> String {
    format!("财务分析报告_{}.{DOCUMENT_EXTENSION}", now.format("%Y%m%d_%H%M%S"))
}

/// Append `.md` unless the name already ends with it
pub fn with_document_extension(path: &Path) -> PathBuf {
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".{DOCUMENT_EXTENSION}"));
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{expense, income, with_merchant};
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            income("2024-01-05 09:00:00", "5000", "工资"),
            with_merchant(expense("2024-01-06 12:00:00", "-30", "餐饮"), "面馆"),
            expense("2024-01-13 19:00:00", "-120", "购物"),
        ])
    }

    fn section<'a>(pages: &'a [Page], title: &str) -> &'a Section {
        pages
            .iter()
            .flat_map(|p| &p.sections)
            .find(|s| s.title.starts_with(title))
            .unwrap()
    }

    #[test]
    fn test_pages_and_summary_values() {
        let pages = build_pages(&dataset(), &ReportOptions::default());
        assert_eq!(pages.len(), 3);

        let summary = section(&pages, "财务数据统计摘要");
        assert_eq!(summary.rows[0], vec!["总交易笔数".to_string(), "3笔".to_string()]);
        assert_eq!(summary.rows[2][1], "¥150.00");
        assert_eq!(summary.rows[3][1], "¥4850.00");

        let merchants = section(&pages, "主要消费商户分析");
        assert_eq!(merchants.rows.len(), 1);
        assert_eq!(merchants.rows[0][0], "面馆");

        let income = section(&pages, "收入来源详细分析");
        assert_eq!(income.rows.last().unwrap()[0], TOTAL_LABEL);

        // two category summaries, then one detail section per expense category
        assert_eq!(pages[2].sections.len(), 4);
    }

    #[test]
    fn test_detail_page_summaries() {
        let pages = build_pages(&dataset(), &ReportOptions::default());

        let spend = section(&pages, "支出分类汇总");
        assert_eq!(spend.header[3], "主要商户");
        assert_eq!(spend.rows.len(), 2);
        assert_eq!(spend.rows[0][0], "购物");
        assert_eq!(spend.rows[1], vec!["餐饮".to_string(), "¥30.00".to_string(), "1笔".to_string(), "面馆".to_string()]);

        let earned = section(&pages, "收入来源汇总");
        assert_eq!(earned.header[3], "主要来源");
        assert_eq!(earned.rows[0][1], "¥5000.00");
        assert_eq!(earned.rows[0][3], "");
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let ds = Dataset::new(vec![with_merchant(
            expense("2024-03-01 12:00:00", "-8", "餐饮"),
            "A|B 小吃",
        )]);
        let md = TerminalRenderer::default().render_markdown(&ds);
        assert!(md.contains("A\\|B 小吃"));
        assert!(!md.contains(" A|B"));

        let text = TerminalRenderer::default().render_text(&ds);
        assert!(text.contains("A|B 小吃"));
    }

    #[test]
    fn test_empty_dataset_renders() {
        let renderer = TerminalRenderer::default();
        let text = renderer.render_text(&Dataset::default());
        assert!(text.contains(NO_DATA));
        assert!(text.contains("总交易笔数"));
        let md = renderer.render_markdown(&Dataset::default());
        assert!(md.starts_with("# 个人财务分析报告 - 概览"));
    }

    #[test]
    fn test_markdown_has_page_breaks_and_tables() {
        let md = TerminalRenderer::default().render_markdown(&dataset());
        assert_eq!(md.matches(PAGE_BREAK).count(), 2);
        assert!(md.contains("## 月度财务统计摘要"));
        assert!(md.contains("| 2024-01"));
    }

    #[test]
    fn test_document_names() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(8, 5, 9).unwrap();
        assert_eq!(default_document_name(now), "财务分析报告_20240701_080509.md");
        assert_eq!(with_document_extension(Path::new("report")), PathBuf::from("report.md"));
        assert_eq!(with_document_extension(Path::new("report.MD")), PathBuf::from("report.MD"));
        assert_eq!(with_document_extension(Path::new("report.pdf")), PathBuf::from("report.pdf.md"));
    }

    #[test]
    fn test_export_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TerminalRenderer::new(ReportOptions {
            output_dir: dir.path().to_path_buf(),
            ..ReportOptions::default()
        });

        let named = renderer.export(&dataset(), Some(Path::new("年度/我的报告"))).unwrap();
        assert_eq!(named, dir.path().join("年度/我的报告.md"));
        let body = fs::read_to_string(&named).unwrap();
        assert!(body.contains("财务数据统计摘要"));

        let default = renderer.export(&dataset(), None).unwrap();
        assert!(default.starts_with(dir.path()));
        assert!(default.file_name().unwrap().to_string_lossy().starts_with("财务分析报告_"));
    }
}
