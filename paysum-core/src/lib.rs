//! paysum-core: canonical transaction records and the merged dataset

pub mod dataset;
pub mod record;
pub mod time;

pub use dataset::Dataset;
pub use record::{Direction, Source, TransactionRecord, UNCATEGORIZED_LABEL, UNKNOWN_LABEL};
pub use time::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
