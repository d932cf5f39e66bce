use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

/// Install the tracing subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }
    formatted
}

/// Reject malformed user input before any file is read.
pub fn validate_args(args: &Args) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("Log file not found: {:?}", args.file);
    }

    args.view_options()?;

    for date in [&args.start_date, &args.end_date].into_iter().flatten() {
        crate::options::parse_date(date)?;
    }
    for time in [&args.start_time, &args.end_time].into_iter().flatten() {
        crate::options::parse_time(time)?;
    }
    if let Some(range) = args.explicit_range()? {
        range.to_filter()?;
    }

    Ok(())
}
