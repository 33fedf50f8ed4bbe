//! File discovery: which exports exist and which platform produced them.

use std::fs;
use std::path::{Path, PathBuf};

use paysum_core::Source;
use serde::Serialize;

use crate::error::Result;

/// Default file-name marker of WeChat Pay exports
pub const WECHAT_MARKER: &str = "微信支付账单";
/// Default file-name marker of Alipay exports
pub const ALIPAY_MARKER: &str = "支付宝";

/// A file to ingest, tagged with the platform it claims to come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub source: Source,
}

impl DiscoveredFile {
    pub fn new(path: impl Into<PathBuf>, source: Source) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Lists the files a merge run should process, in processing order
pub trait SourceDiscovery {
    fn discover(&self) -> Result<Vec<DiscoveredFile>>;
}

/// A fixed list, for callers that already know their files
impl SourceDiscovery for Vec<DiscoveredFile> {
    fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        Ok(self.clone())
    }
}

/// `*<marker>*.<ext>` for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    pub source: Source,
    pub marker: String,
    /// Tried in order; earlier extensions are listed first
    pub extensions: Vec<String>,
}

impl FilePattern {
    pub fn new(source: Source, marker: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            source,
            marker: marker.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn matches(&self, file_name: &str, ext: &str) -> bool {
        file_name.contains(&self.marker) && file_name.ends_with(&format!(".{ext}"))
    }
}

/// WeChat xlsx first, then Alipay csv, then Alipay xlsx
pub fn default_patterns(wechat_marker: &str, alipay_marker: &str) -> Vec<FilePattern> {
    vec![
        FilePattern::new(Source::WECHAT, wechat_marker, &["xlsx"]),
        FilePattern::new(Source::ALIPAY, alipay_marker, &["csv", "xlsx"]),
    ]
}

/// Non-recursive listing of one directory.
///
/// Order is pattern order, then extension order, then file name. A file is
/// claimed by the first pattern that matches it. Office lock files (`~$...`)
/// are ignored.
#[derive(Debug, Clone)]
pub struct DirectoryDiscovery {
    dir: PathBuf,
    patterns: Vec<FilePattern>,
}

impl DirectoryDiscovery {
    pub fn new(dir: impl Into<PathBuf>, patterns: Vec<FilePattern>) -> Self {
        Self {
            dir: dir.into(),
            patterns,
        }
    }

    pub fn with_default_patterns(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, default_patterns(WECHAT_MARKER, ALIPAY_MARKER))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SourceDiscovery for DirectoryDiscovery {
    fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with("~$") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut found: Vec<DiscoveredFile> = Vec::new();
        for pattern in &self.patterns {
            for ext in &pattern.extensions {
                for name in names.iter().filter(|n| pattern.matches(n, ext)) {
                    let path = self.dir.join(name);
                    if found.iter().any(|f| f.path == path) {
                        continue;
                    }
                    found.push(DiscoveredFile::new(path, pattern.source.clone()));
                }
            }
        }
        Ok(found)
    }
}
