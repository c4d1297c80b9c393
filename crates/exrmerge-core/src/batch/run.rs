use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{info, warn};

use crate::codec::Codec;
use crate::error::Result;
use crate::jobs::{build_jobs, InputFile};

use super::dispatcher::{available_parallelism, resolve_worker_count, spawn_workers, Batch};
use super::state::{Progress, ProgressHook, RunState};

/// Everything needed to start a batch.
pub struct BatchInput {
    pub files: Vec<InputFile>,
    /// Output path template; the rightmost `#` run receives the frame number.
    pub output: String,
    /// Worker count, 0 for automatic.
    pub threads: usize,
    pub on_progress: Option<ProgressHook>,
}

impl BatchInput {
    pub fn new(files: Vec<InputFile>, output: impl Into<String>) -> Self {
        Self {
            files,
            output: output.into(),
            threads: 0,
            on_progress: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_progress<F>(mut self, hook: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(hook));
        self
    }
}

/// Final state of a joined batch.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub progress: Progress,
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Handle to a running batch.
///
/// Dropping the handle (or calling [`BatchRun::release`]) joins every worker,
/// blocking until all jobs have been attempted.
pub struct BatchRun {
    state: Arc<RunState>,
    workers: Vec<JoinHandle<()>>,
    jobs: usize,
}

/// Start merging `input` on background workers and return immediately.
pub fn submit<C: Codec + 'static>(codec: Arc<C>, input: BatchInput) -> Result<BatchRun> {
    let total_files = input.files.len();
    let jobs = build_jobs(input.files);
    let job_count = jobs.len();
    let workers = resolve_worker_count(input.threads, available_parallelism());

    info!(
        files = total_files,
        frames = job_count,
        workers,
        output = %input.output,
        "Starting batch"
    );

    let state = Arc::new(RunState::new(
        total_files,
        job_count,
        workers,
        input.on_progress,
    ));
    let batch = Arc::new(Batch {
        codec,
        jobs,
        output: input.output,
        state: Arc::clone(&state),
    });
    let handles = spawn_workers(&batch, workers)?;

    Ok(BatchRun {
        state,
        workers: handles,
        jobs: job_count,
    })
}

impl BatchRun {
    /// Current progress. Never blocks.
    pub fn poll(&self) -> Progress {
        self.state.snapshot()
    }

    pub fn error_count(&self) -> usize {
        self.state.error_count()
    }

    /// Error message at `index`, `None` if out of range.
    pub fn error(&self, index: usize) -> Option<String> {
        self.state.error(index)
    }

    /// Copy of every error recorded so far.
    pub fn errors(&self) -> Vec<String> {
        self.state.error_list()
    }

    pub fn job_count(&self) -> usize {
        self.jobs
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Join all workers and return the final progress and errors.
    pub fn wait(mut self) -> BatchReport {
        self.join();
        BatchReport {
            progress: self.state.snapshot(),
            errors: self.state.error_list(),
        }
    }

    /// Join all workers and free the batch.
    pub fn release(self) {
        drop(self);
    }

    fn join(&mut self) {
        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            warn!(panicked, "Batch workers panicked");
        }
    }
}

impl Drop for BatchRun {
    fn drop(&mut self) {
        self.join();
    }
}
