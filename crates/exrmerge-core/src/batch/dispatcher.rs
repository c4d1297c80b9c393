use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::consts::{RESERVED_CORES, WORKER_THREAD_PREFIX};
use crate::error::{ExrMergeError, Result};
use crate::jobs::FrameJob;
use crate::merge::merge_frame;

use super::state::RunState;

/// Number of workers for a batch: `requested` if nonzero, otherwise all
/// but [`RESERVED_CORES`] of `available`, never less than one.
pub fn resolve_worker_count(requested: usize, available: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    available.saturating_sub(RESERVED_CORES).max(1)
}

/// Hardware parallelism reported by the OS, 1 if unknown.
pub fn available_parallelism() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Immutable batch data shared by all workers.
pub(super) struct Batch<C> {
    pub(super) codec: Arc<C>,
    pub(super) jobs: Vec<FrameJob>,
    pub(super) output: String,
    pub(super) state: Arc<RunState>,
}

/// Marks the worker finished when dropped, so the poller still sees
/// completion if the progress hook panics.
struct FinishGuard<'a>(&'a RunState);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.worker_finished();
        self.0.notify();
    }
}

fn worker_loop<C: Codec>(batch: &Batch<C>) {
    let state = batch.state.as_ref();
    let _finish = FinishGuard(state);

    while let Some(index) = state.claim() {
        let job = &batch.jobs[index];
        debug!(
            frame = %job.label(),
            files = job.files.len(),
            "Merging frame"
        );

        match merge_frame(batch.codec.as_ref(), job, &batch.output, &state.progress) {
            Ok(outcome) => info!(
                frame = %job.label(),
                channels = outcome.channels,
                output = %outcome.output.display(),
                "Frame written"
            ),
            Err(err) => {
                warn!(frame = %job.label(), "{err}");
                state.record_error(err.to_string());
            }
        }

        state.notify();
    }
}

/// Spawn `count` workers pulling jobs from `batch`.
///
/// Fails only if no worker could be started; a partial pool keeps running
/// with the threads that did start.
pub(super) fn spawn_workers<C: Codec + 'static>(
    batch: &Arc<Batch<C>>,
    count: usize,
) -> Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(count);

    for i in 0..count {
        let shared = Arc::clone(batch);
        let spawned = thread::Builder::new()
            .name(format!("{WORKER_THREAD_PREFIX}-{i}"))
            .spawn(move || worker_loop(&shared));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(source) if handles.is_empty() => {
                batch.state.set_workers(0);
                return Err(ExrMergeError::Spawn { source });
            }
            Err(err) => {
                warn!(requested = count, started = handles.len(), "Worker spawn failed: {err}");
                break;
            }
        }
    }

    batch.state.set_workers(handles.len());
    Ok(handles)
}
