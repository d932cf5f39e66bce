use clap::Parser;
use std::path::PathBuf;

use crate::options::{parse_date, parse_time, OptionsError, RangeInput, ViewOptions};
use crate::record::{
    ColumnNames, DEFAULT_ADDRESS_COLUMN, DEFAULT_CATEGORY_COLUMN, DEFAULT_TARGET_COLUMN,
    DEFAULT_TIMESTAMP_COLUMN,
};

#[derive(Parser, Debug)]
#[command(
    name = "loglens",
    about = "Summarize a CSV access-log export: requests per address, distinct addresses per domain and category, and the busiest minute",
    version,
    long_about = None
)]
pub struct Args {
    /// CSV log file to analyze
    pub file: PathBuf,

    /// Number of source addresses to display, or "all"
    #[arg(long, allow_negative_numbers = true, default_value = "all", env = "LOGLENS_TOP_IP")]
    pub top_ip: String,

    /// Number of domains to display, or "all"
    #[arg(long, allow_negative_numbers = true, default_value = "all", env = "LOGLENS_TOP_DOMAIN")]
    pub top_domain: String,

    /// Number of categories to display, or "all"
    #[arg(long, allow_negative_numbers = true, default_value = "all", env = "LOGLENS_TOP_CATEGORY")]
    pub top_category: String,

    /// First day of the analysis window (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Start time on the first day (HH:MM, default 00:00)
    #[arg(long)]
    pub start_time: Option<String>,

    /// Last day of the analysis window (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub end_date: Option<String>,

    /// End time on the last day, inclusive of the whole minute (HH:MM, default 23:59)
    #[arg(long)]
    pub end_time: Option<String>,

    /// Header of the source address column
    #[arg(long, default_value = DEFAULT_ADDRESS_COLUMN, env = "LOGLENS_ADDRESS_COLUMN")]
    pub address_column: String,

    /// Header of the URL or hostname column
    #[arg(long, default_value = DEFAULT_TARGET_COLUMN, env = "LOGLENS_TARGET_COLUMN")]
    pub target_column: String,

    /// Header of the category column
    #[arg(long, default_value = DEFAULT_CATEGORY_COLUMN, env = "LOGLENS_CATEGORY_COLUMN")]
    pub category_column: String,

    /// Header of the Unix-seconds timestamp column
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN, env = "LOGLENS_TIMESTAMP_COLUMN")]
    pub timestamp_column: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn column_names(&self) -> ColumnNames {
        ColumnNames {
            address: self.address_column.clone(),
            target: self.target_column.clone(),
            category: self.category_column.clone(),
            timestamp: self.timestamp_column.clone(),
        }
    }

    pub fn view_options(&self) -> Result<ViewOptions, OptionsError> {
        ViewOptions::parse(&self.top_ip, &self.top_domain, &self.top_category)
    }

    pub fn has_range(&self) -> bool {
        self.start_date.is_some()
            || self.start_time.is_some()
            || self.end_date.is_some()
            || self.end_time.is_some()
    }

    /// Window requested on the command line, with unspecified parts taken
    /// from `defaults` (normally the file's extent). `None` when no window
    /// was asked for or the file has no extent to fill gaps from.
    pub fn range_input(
        &self,
        defaults: Option<RangeInput>,
    ) -> Result<Option<RangeInput>, OptionsError> {
        if !self.has_range() {
            return Ok(None);
        }
        let Some(defaults) = defaults else {
            return Ok(None);
        };

        Ok(Some(RangeInput {
            start_date: parse_or(self.start_date.as_deref(), parse_date, defaults.start_date)?,
            start_time: parse_or(self.start_time.as_deref(), parse_time, defaults.start_time)?,
            end_date: parse_or(self.end_date.as_deref(), parse_date, defaults.end_date)?,
            end_time: parse_or(self.end_time.as_deref(), parse_time, defaults.end_time)?,
        }))
    }

    /// Window fully determined by the command line, so it can be checked
    /// before the file is read. `None` unless both dates were given.
    pub fn explicit_range(&self) -> Result<Option<RangeInput>, OptionsError> {
        let (Some(start_date), Some(end_date)) = (&self.start_date, &self.end_date) else {
            return Ok(None);
        };
        let days = RangeInput::whole_days(parse_date(start_date)?, parse_date(end_date)?);
        self.range_input(Some(days))
    }
}

fn parse_or<T>(
    value: Option<&str>,
    parse: fn(&str) -> Result<T, OptionsError>,
    default: T,
) -> Result<T, OptionsError> {
    value.map(parse).transpose().map(|parsed| parsed.unwrap_or(default))
}
