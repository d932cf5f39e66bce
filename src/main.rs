use anyhow::{Context, Result};
use clap::Parser;
use loglens::{report, utils, Args, Session};
use std::io::Write;
use std::time::Instant;
use tracing::{error, info};

fn run(args: &Args) -> Result<()> {
    let total_start_time = Instant::now();
    let mut session = Session::new(args.column_names());
    session.set_view(args.view_options()?);

    session
        .load(&args.file)
        .with_context(|| format!("Failed to analyze {:?}", args.file))?;

    if let Some(range) = args.range_input(session.range_defaults())? {
        session
            .apply(&range)
            .with_context(|| format!("Failed to filter {:?}", args.file))?;
    }

    let result = session
        .last_result()
        .context("Analysis produced no result")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, result, session.view())?;
    out.flush()?;

    info!(
        action = "complete",
        component = "loglens",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    utils::validate_args(&args)?;

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
