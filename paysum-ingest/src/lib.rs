//! paysum-ingest: bill export ingestion (header location, per-platform
//! adapters, normalization) and the multi-file merge.

pub mod discovery;
pub mod error;
pub mod header;
pub mod merge;
pub mod normalize;
pub mod parsers;
pub mod table;
pub mod types;

pub use discovery::{
    default_patterns, DirectoryDiscovery, DiscoveredFile, FilePattern, SourceDiscovery,
    ALIPAY_MARKER, WECHAT_MARKER,
};
pub use error::{IngestError, Result};
pub use header::{find_header_row, locate_header, DEFAULT_SEARCH_WINDOW};
pub use merge::{DatasetMerger, FileOutcome, MergeReport};
pub use normalize::{normalize, normalize_record, sanitize_amount, DirectionRule, Normalized};
pub use parsers::alipay::ALIPAY_HEADER_KEYWORDS;
pub use parsers::wechat::WECHAT_HEADER_ROW;
pub use parsers::{AlipayAdapter, SourceAdapter, WechatAdapter};
pub use types::{AdapterReport, ColumnMap, Field, FileSummary, NeutralRule, RawRecord};
