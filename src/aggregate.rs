use chrono::{DateTime, Utc};
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::domain_key;
use crate::error::{AnalyzeError, Result};
use crate::record::{ColumnMap, ColumnNames, LogRecord, RowOutcome, SkipReason};
use crate::stats::{AggregationResult, TimeRange};

/// Inclusive time bounds; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RangeFilter {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }
}

/// Truncate a timestamp to the start of its minute.
pub fn minute_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(60), 0).unwrap_or(ts)
}

/// Aggregate the CSV log at `path`. The file handle is released when the
/// pass finishes, whether it succeeds or not.
pub fn aggregate_file(
    path: &Path,
    columns: &ColumnNames,
    filter: &RangeFilter,
) -> Result<AggregationResult> {
    let start_time = Instant::now();
    info!(action = "start", component = "aggregation", file_path = ?path, "Opening log file");

    let file = File::open(path).map_err(|source| AnalyzeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let result = aggregate(file, columns, filter)?;

    info!(
        action = "complete",
        component = "aggregation",
        file_path = ?path,
        duration_ms = start_time.elapsed().as_millis(),
        "Log file aggregated"
    );
    Ok(result)
}

/// Single streaming pass over CSV rows from `reader`.
///
/// Only a missing or unreadable header, or an I/O failure of the underlying
/// reader, fails the run. Malformed rows are counted and skipped.
pub fn aggregate<R: Read>(
    reader: R,
    columns: &ColumnNames,
    filter: &RangeFilter,
) -> Result<AggregationResult> {
    let start_time = Instant::now();
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers().map_err(AnalyzeError::Header)?.clone();
    let column_map = ColumnMap::from_headers(&headers, columns)?;
    info!(
        action = "configure",
        component = "aggregation",
        columns = headers.len(),
        range_start = ?filter.start,
        range_end = ?filter.end,
        "Resolved CSV columns"
    );

    let mut accumulator = Accumulator::new(filter);
    let mut row = ByteRecord::new();
    loop {
        let outcome = match csv_reader.read_byte_record(&mut row) {
            Ok(true) => column_map.classify(&row),
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(AnalyzeError::Read(e)),
            Err(e) => RowOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
        };
        accumulator.push(outcome);
    }

    let result = accumulator.finish();
    let counters = result.counters();
    info!(
        action = "complete",
        component = "aggregation",
        rows_read = counters.rows_read,
        rows_skipped = counters.rows_skipped,
        rows_filtered = counters.rows_filtered,
        addresses = result.counts_by_address().len(),
        domains = result.addresses_by_domain().len(),
        categories = result.addresses_by_category().len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Aggregation pass completed"
    );
    Ok(result)
}

struct Accumulator<'a> {
    filter: &'a RangeFilter,
    result: AggregationResult,
}

impl<'a> Accumulator<'a> {
    fn new(filter: &'a RangeFilter) -> Self {
        Self {
            filter,
            result: AggregationResult::default(),
        }
    }

    fn push(&mut self, outcome: RowOutcome) {
        self.result.counters.rows_read += 1;
        match outcome {
            RowOutcome::Accepted(record) => self.accept(record),
            RowOutcome::Skipped(reason) => {
                self.result.counters.rows_skipped += 1;
                debug!(
                    action = "skip",
                    component = "aggregation",
                    row = self.result.counters.rows_read,
                    reason = %reason,
                    "Skipping malformed row"
                );
            }
        }
    }

    fn accept(&mut self, record: LogRecord) {
        // Extent covers every valid row, filtered or not.
        TimeRange::observe(&mut self.result.time_range, record.timestamp);

        if !self.filter.contains(record.timestamp) {
            self.result.counters.rows_filtered += 1;
            return;
        }

        let domain = domain_key(&record.target);
        let result = &mut self.result;

        *result.counts_by_address.entry_mut(&record.address) += 1;
        result
            .addresses_by_domain
            .entry_mut(&domain)
            .insert(record.address.clone());
        result
            .addresses_by_category
            .entry_mut(&record.category)
            .insert(record.address);
        *result
            .activity_by_minute
            .entry(minute_bucket(record.timestamp))
            .or_insert(0) += 1;
    }

    fn finish(self) -> AggregationResult {
        self.result
    }
}
