//! Merge every discovered export into one time-ordered dataset.

use std::collections::BTreeMap;
use std::path::PathBuf;

use paysum_core::{Dataset, Source, TransactionRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::discovery::{DiscoveredFile, SourceDiscovery};
use crate::error::{IngestError, Result};
use crate::parsers::{AlipayAdapter, SourceAdapter, WechatAdapter};
use crate::types::{AdapterReport, FileSummary};

/// What happened to one discovered file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Adapted(FileSummary),
    Skipped {
        path: PathBuf,
        source: Source,
        error: String,
    },
}

impl FileOutcome {
    pub fn is_adapted(&self) -> bool {
        matches!(self, FileOutcome::Adapted(_))
    }
}

/// Merged dataset plus the per-file account of how it was built
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub dataset: Dataset,
    pub files: Vec<FileOutcome>,
}

impl MergeReport {
    /// Records merged per source
    pub fn rows_by_source(&self) -> BTreeMap<Source, usize> {
        self.dataset.count_by_source()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_adapted())
    }
}

/// Runs the matching adapter over every discovered file
pub struct DatasetMerger<D: SourceDiscovery> {
    discovery: D,
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl<D: SourceDiscovery> DatasetMerger<D> {
    /// Merger with no adapters registered
    pub fn new(discovery: D) -> Self {
        Self {
            discovery,
            adapters: Vec::new(),
        }
    }

    /// Merger with the WeChat and Alipay adapters at their default settings
    pub fn with_default_adapters(discovery: D) -> Self {
        Self::new(discovery)
            .with_adapter(WechatAdapter::default())
            .with_adapter(AlipayAdapter::default())
    }

    /// Register an adapter; a later adapter for the same source replaces the earlier one
    pub fn with_adapter(mut self, adapter: impl SourceAdapter + 'static) -> Self {
        let source = adapter.source();
        self.adapters.retain(|a| a.source() != source);
        self.adapters.push(Box::new(adapter));
        self
    }

    fn adapter_for(&self, source: &Source) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.source() == *source)
            .map(|a| a.as_ref())
    }

    /// Adapt every file and merge the results, most recent first.
    ///
    /// Files that fail are recorded as skipped and do not stop the run.
    /// Returns `IngestError::NoData` when no file was found or none could
    /// be adapted; a run where files adapted but yielded no rows returns an
    /// empty dataset instead.
    pub fn merge(&self) -> Result<MergeReport> {
        let files = self.discovery.discover()?;
        if files.is_empty() {
            warn!("no bill exports found");
            return Err(IngestError::NoData { files_found: 0 });
        }

        let files_found = files.len();
        let mut outcomes = Vec::with_capacity(files_found);
        let mut records: Vec<TransactionRecord> = Vec::new();

        for file in files {
            info!(path = %file.path.display(), source = %file.source, "processing export");
            match self.adapt_one(&file) {
                Ok(report) => {
                    records.extend(report.records);
                    outcomes.push(FileOutcome::Adapted(report.summary));
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "skipping export");
                    outcomes.push(FileOutcome::Skipped {
                        path: file.path,
                        source: file.source,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !outcomes.iter().any(FileOutcome::is_adapted) {
            return Err(IngestError::NoData { files_found });
        }

        let dataset = Dataset::new(records);
        for (source, count) in dataset.count_by_source() {
            info!(source = %source, rows = count, "merged rows");
        }
        info!(total = dataset.len(), "merge complete");

        Ok(MergeReport {
            dataset,
            files: outcomes,
        })
    }

    fn adapt_one(&self, file: &DiscoveredFile) -> Result<AdapterReport> {
        let adapter = self.adapter_for(&file.source).ok_or_else(|| {
            IngestError::format(&file.path, format!("no adapter registered for source {}", file.source))
        })?;
        adapter.adapt(&file.path)
    }
}
