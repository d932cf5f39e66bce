use chrono::{DateTime, Utc};
use csv::{ByteRecord, StringRecord};
use std::fmt;

use crate::error::{AnalyzeError, Result};

pub const DEFAULT_ADDRESS_COLUMN: &str = "Source IP";
pub const DEFAULT_TARGET_COLUMN: &str = "Host Name";
pub const DEFAULT_CATEGORY_COLUMN: &str = "Category";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Timestamp (UTC) Seconds";

/// Header names of the four fields a log row must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub address: String,
    pub target: String,
    pub category: String,
    pub timestamp: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS_COLUMN.to_string(),
            target: DEFAULT_TARGET_COLUMN.to_string(),
            category: DEFAULT_CATEGORY_COLUMN.to_string(),
            timestamp: DEFAULT_TIMESTAMP_COLUMN.to_string(),
        }
    }
}

/// Positions of the required fields inside a CSV record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    address: usize,
    target: usize,
    category: usize,
    timestamp: usize,
}

/// One well-formed input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub address: String,
    pub target: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Address,
    Target,
    Category,
    Timestamp,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Address => "address",
            Field::Target => "target",
            Field::Category => "category",
            Field::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The CSV reader could not decode the row at all.
    Unreadable(String),
    MissingField(Field),
    /// A required field holds bytes that are not UTF-8.
    InvalidUtf8(Field),
    InvalidTimestamp(String),
    /// An integer that does not map onto a representable instant.
    TimestampOutOfRange(i64),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "unreadable row: {}", e),
            SkipReason::MissingField(field) => write!(f, "missing {} field", field),
            SkipReason::InvalidUtf8(field) => write!(f, "{} field is not valid UTF-8", field),
            SkipReason::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{}'", raw),
            SkipReason::TimestampOutOfRange(secs) => {
                write!(f, "timestamp {} out of range", secs)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(LogRecord),
    Skipped(SkipReason),
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord, names: &ColumnNames) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AnalyzeError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            address: position(&names.address)?,
            target: position(&names.target)?,
            category: position(&names.category)?,
            timestamp: position(&names.timestamp)?,
        })
    }

    /// Classify a raw row. Only the four mapped fields are decoded, so
    /// undecodable bytes elsewhere in the row don't affect the outcome.
    pub fn classify(&self, row: &ByteRecord) -> RowOutcome {
        match self.extract(row) {
            Ok(record) => RowOutcome::Accepted(record),
            Err(reason) => RowOutcome::Skipped(reason),
        }
    }

    fn extract(&self, row: &ByteRecord) -> std::result::Result<LogRecord, SkipReason> {
        let field = |index: usize, which: Field| {
            let bytes = row.get(index).ok_or(SkipReason::MissingField(which))?;
            std::str::from_utf8(bytes).map_err(|_| SkipReason::InvalidUtf8(which))
        };

        let address = field(self.address, Field::Address)?;
        let target = field(self.target, Field::Target)?;
        let category = field(self.category, Field::Category)?;
        let raw_timestamp = field(self.timestamp, Field::Timestamp)?;

        let secs: i64 = raw_timestamp
            .trim()
            .parse()
            .map_err(|_| SkipReason::InvalidTimestamp(raw_timestamp.to_string()))?;
        let timestamp =
            DateTime::from_timestamp(secs, 0).ok_or(SkipReason::TimestampOutOfRange(secs))?;

        Ok(LogRecord {
            address: address.to_string(),
            target: target.to_string(),
            category: category.to_string(),
            timestamp,
        })
    }
}
