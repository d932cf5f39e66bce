//! Interactive-shell state: which file is open, its extent, and the result
//! currently on display. Runs are executed on the rayon pool and handed back
//! over a channel so the caller's thread stays free while a file is read.

use crossbeam::channel::{self, Receiver};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate_file, RangeFilter};
use crate::error::AnalyzeError;
use crate::options::{OptionsError, RangeInput, ViewOptions};
use crate::record::ColumnNames;
use crate::stats::{AggregationResult, TimeRange};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No log file selected")]
    NoFile,

    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("Analysis worker stopped before delivering a result")]
    WorkerLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Full unfiltered read of a newly selected file.
    Load,
    /// Re-read of the current file with a range filter.
    Filter,
}

/// An aggregation submitted to the worker pool. Dropping it abandons the run;
/// the worker's result is then discarded.
#[derive(Debug)]
pub struct PendingRun {
    kind: RunKind,
    path: PathBuf,
    receiver: Receiver<Result<AggregationResult, AnalyzeError>>,
}

impl PendingRun {
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Run [`aggregate_file`] on the rayon pool and deliver the outcome over the
/// returned channel.
pub fn spawn_analysis(
    path: PathBuf,
    columns: ColumnNames,
    filter: RangeFilter,
) -> Receiver<Result<AggregationResult, AnalyzeError>> {
    let (sender, receiver) = channel::bounded(1);
    rayon::spawn(move || {
        let outcome = aggregate_file(&path, &columns, &filter);
        if sender.send(outcome).is_err() {
            debug!(
                action = "discard",
                component = "session",
                file_path = ?path,
                "Run abandoned before completion"
            );
        }
    });
    receiver
}

#[derive(Debug, Default)]
pub struct Session {
    columns: ColumnNames,
    current_file: Option<PathBuf>,
    extent: Option<TimeRange>,
    last_result: Option<AggregationResult>,
    view: ViewOptions,
}

impl Session {
    pub fn new(columns: ColumnNames) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Extent of the current file as of its last full load.
    pub fn extent(&self) -> Option<TimeRange> {
        self.extent
    }

    pub fn last_result(&self) -> Option<&AggregationResult> {
        self.last_result.as_ref()
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewOptions) {
        self.view = view;
    }

    /// Pre-filled window for the current file: whole days covering its extent.
    pub fn range_defaults(&self) -> Option<RangeInput> {
        self.extent.as_ref().map(RangeInput::covering)
    }

    /// Back to uncapped sections; returns the window to pre-fill again.
    pub fn reset_options(&mut self) -> Option<RangeInput> {
        self.view = ViewOptions::default();
        self.range_defaults()
    }

    pub fn begin_load(&self, path: impl Into<PathBuf>) -> PendingRun {
        let path = path.into();
        info!(
            action = "submit",
            component = "session",
            kind = "load",
            file_path = ?path,
            "Submitting analysis run"
        );
        PendingRun {
            kind: RunKind::Load,
            receiver: spawn_analysis(
                path.clone(),
                self.columns.clone(),
                RangeFilter::unbounded(),
            ),
            path,
        }
    }

    /// Validate `range` and submit a filtered re-read of the current file.
    pub fn begin_filter(&self, range: &RangeInput) -> Result<PendingRun, SessionError> {
        let path = self.current_file.clone().ok_or(SessionError::NoFile)?;
        let filter = range.to_filter()?;
        info!(
            action = "submit",
            component = "session",
            kind = "filter",
            file_path = ?path,
            range_start = ?filter.start,
            range_end = ?filter.end,
            "Submitting analysis run"
        );

        Ok(PendingRun {
            kind: RunKind::Filter,
            receiver: spawn_analysis(path.clone(), self.columns.clone(), filter),
            path,
        })
    }

    /// Wait for `run` and apply its outcome. On failure the previous state,
    /// including the displayed result, is left untouched.
    pub fn finish(&mut self, run: PendingRun) -> Result<&AggregationResult, SessionError> {
        let outcome = run.receiver.recv().map_err(|_| SessionError::WorkerLost)?;
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(action = "complete", component = "session", file_path = ?run.path, error = %e, "Analysis run failed");
                return Err(e.into());
            }
        };

        if run.kind == RunKind::Load {
            self.current_file = Some(run.path);
            self.extent = result.time_range();
        }
        Ok(&*self.last_result.insert(result))
    }

    /// Select `path` and read it in full.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<&AggregationResult, SessionError> {
        let run = self.begin_load(path);
        self.finish(run)
    }

    /// Re-read the current file restricted to `range`.
    pub fn apply(&mut self, range: &RangeInput) -> Result<&AggregationResult, SessionError> {
        let run = self.begin_filter(range)?;
        self.finish(run)
    }
}
