pub mod aggregate;
pub mod args;
pub mod domain;
pub mod error;
pub mod options;
pub mod record;
pub mod report;
pub mod session;
pub mod stats;
pub mod utils;

pub use aggregate::{aggregate, aggregate_file, RangeFilter};
pub use args::Args;
pub use error::AnalyzeError;
pub use options::{RangeInput, ViewOptions};
pub use record::{ColumnNames, LogRecord, RowOutcome, SkipReason};
pub use session::{Session, SessionError};
pub use stats::{AggregationResult, TimeRange};
