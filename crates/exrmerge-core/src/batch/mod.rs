mod dispatcher;
mod run;
mod state;

pub use dispatcher::{available_parallelism, resolve_worker_count};
pub use run::{submit, BatchInput, BatchReport, BatchRun};
pub use state::{Progress, ProgressHook};
