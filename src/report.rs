use std::io::{self, Write};

use crate::options::ViewOptions;
use crate::stats::AggregationResult;
use crate::utils::format_number;

const RULE_WIDTH: usize = 60;
const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Render `result` as plain text, each section capped by `view`.
pub fn write_report<W: Write>(
    out: &mut W,
    result: &AggregationResult,
    view: &ViewOptions,
) -> io::Result<()> {
    writeln!(
        out,
        "Records found: {}",
        format_number(result.total_records())
    )?;
    match result.time_range() {
        Some(range) => writeln!(
            out,
            "Log extent: {} to {}",
            range.min.format(MINUTE_FORMAT),
            range.max.format(MINUTE_FORMAT)
        )?,
        None => writeln!(out, "Log extent: no valid rows")?,
    }

    write_heading(out, "Requests per source address")?;
    for (address, count) in result.top_addresses(view.top_addresses) {
        writeln!(out, "- {}: {}", address, format_number(count))?;
    }

    write_heading(out, "Distinct addresses per domain")?;
    for (domain, distinct) in result.top_domains(view.top_domains) {
        writeln!(out, "- {}: {}", domain, format_number(distinct as u64))?;
    }

    write_heading(out, "Distinct addresses per category")?;
    for (category, distinct) in result.top_categories(view.top_categories) {
        writeln!(out, "- {}: {}", category, format_number(distinct as u64))?;
    }

    writeln!(out)?;
    match result.peak_minute() {
        Some((minute, count)) => writeln!(
            out,
            "Peak activity: {} ({} requests)",
            minute.format(MINUTE_FORMAT),
            format_number(count)
        )?,
        None => writeln!(out, "Peak activity: no activity in range")?,
    }

    writeln!(out, "\nAnalysis complete")
}

fn write_heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}\n{}", title, "-".repeat(RULE_WIDTH))
}
