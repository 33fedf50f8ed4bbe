use anyhow::{Context, Result};
use paysum_ingest::{ALIPAY_MARKER, DEFAULT_SEARCH_WINDOW, WECHAT_HEADER_ROW, WECHAT_MARKER};
use paysum_report::{ReportOptions, SAMPLE_RECORDS, SAMPLE_SEED};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "paysum.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestSection,
    pub discovery: DiscoverySection,
    pub report: ReportSection,
    pub sample: SampleSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Rows scanned for the Alipay header
    pub header_search_window: usize,
    /// 0-based header row of WeChat exports
    pub wechat_header_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub wechat_marker: String,
    pub alipay_marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub top_merchants: usize,
    pub category_slices: usize,
    pub top_descriptions: usize,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSection {
    pub records: usize,
    pub seed: u64,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            header_search_window: DEFAULT_SEARCH_WINDOW,
            wechat_header_row: WECHAT_HEADER_ROW,
        }
    }
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            wechat_marker: WECHAT_MARKER.to_string(),
            alipay_marker: ALIPAY_MARKER.to_string(),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        let options = ReportOptions::default();
        Self {
            top_merchants: options.top_merchants,
            category_slices: options.category_slices,
            top_descriptions: options.top_descriptions,
            output_dir: options.output_dir,
        }
    }
}

impl Default for SampleSection {
    fn default() -> Self {
        Self {
            records: SAMPLE_RECORDS,
            seed: SAMPLE_SEED,
        }
    }
}

impl Config {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_merchants: self.report.top_merchants,
            category_slices: self.report.category_slices,
            top_descriptions: self.report.top_descriptions,
            output_dir: self.report.output_dir.clone(),
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Missing file means defaults; missing keys fall back individually.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}
