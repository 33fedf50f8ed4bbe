//! paysum-report: statistics over the merged dataset, report rendering, and
//! demonstration data

pub mod breakdown;
pub mod patterns;
pub mod render;
pub mod sample;
pub mod summary;

#[cfg(test)]
mod test_support;

pub use breakdown::{
    distinct_counterparties, expense_by_category, expense_category_summary, expense_details,
    income_by_category, income_category_summary, income_sources, payment_methods,
    top_expense_descriptions, top_income_descriptions, top_merchants, CategoryDetail,
    CategorySummary, IncomeSource, Slice, SUMMARY_COUNTERPARTIES,
};
pub use patterns::{
    hourly_pattern, weekday_label, weekday_pattern, weekly_trend, HourlyPattern, SpendBucket,
    WeekRow, WeekdayPattern, WEEKDAY_LABELS,
};
pub use render::{
    build_pages, default_document_name, with_document_extension, Page, ReportOptions,
    ReportRenderer, Section, TerminalRenderer,
};
pub use sample::{sample_dataset, SAMPLE_RECORDS, SAMPLE_SEED};
pub use summary::{monthly_summary, MonthlyRow, SummaryStats, TOTAL_LABEL};
