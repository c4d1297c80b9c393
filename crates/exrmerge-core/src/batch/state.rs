use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Snapshot of a running batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Milestones reached: one per loaded file, one per finished job.
    pub done: usize,
    /// Input file count plus job count. `done` may stay below this when a
    /// job stops before loading all of its files.
    pub max: usize,
    /// Every worker has left its loop.
    pub finished: bool,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return if self.finished { 1.0 } else { 0.0 };
        }
        (self.done as f32 / self.max as f32).min(1.0)
    }
}

/// Called after every job and once per worker on exit.
///
/// Runs on worker threads and may be invoked concurrently from several of
/// them.
pub type ProgressHook = Arc<dyn Fn(Progress) + Send + Sync>;

/// Counters and error log shared between workers and the polling caller.
pub(crate) struct RunState {
    next_job: AtomicUsize,
    pub(crate) progress: AtomicUsize,
    workers_done: AtomicUsize,
    workers: AtomicUsize,
    total_files: usize,
    total_jobs: usize,
    errors: Mutex<Vec<String>>,
    on_progress: Option<ProgressHook>,
}

impl RunState {
    pub(crate) fn new(
        total_files: usize,
        total_jobs: usize,
        workers: usize,
        on_progress: Option<ProgressHook>,
    ) -> Self {
        Self {
            next_job: AtomicUsize::new(0),
            progress: AtomicUsize::new(0),
            workers_done: AtomicUsize::new(0),
            workers: AtomicUsize::new(workers),
            total_files,
            total_jobs,
            errors: Mutex::new(Vec::new()),
            on_progress,
        }
    }

    /// Claim the next unclaimed job index, or `None` once all are taken.
    pub(crate) fn claim(&self) -> Option<usize> {
        let index = self.next_job.fetch_add(1, Ordering::Relaxed);
        (index < self.total_jobs).then_some(index)
    }

    pub(crate) fn set_workers(&self, workers: usize) {
        self.workers.store(workers, Ordering::Release);
    }

    pub(crate) fn worker_finished(&self) {
        self.workers_done.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn snapshot(&self) -> Progress {
        let finished = self.workers_done.load(Ordering::Acquire)
            == self.workers.load(Ordering::Acquire);
        Progress {
            done: self.progress.load(Ordering::Relaxed),
            max: self.total_files + self.total_jobs,
            finished,
        }
    }

    pub(crate) fn notify(&self) {
        if let Some(hook) = &self.on_progress {
            hook(self.snapshot());
        }
    }

    fn errors(&self) -> MutexGuard<'_, Vec<String>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record_error(&self, message: String) {
        self.errors().push(message);
    }

    pub(crate) fn error_count(&self) -> usize {
        self.errors().len()
    }

    pub(crate) fn error(&self, index: usize) -> Option<String> {
        self.errors().get(index).cloned()
    }

    pub(crate) fn error_list(&self) -> Vec<String> {
        self.errors().clone()
    }
}
