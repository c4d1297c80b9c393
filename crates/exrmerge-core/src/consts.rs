/// Character marking where the frame number goes in an output template.
pub const FRAME_PLACEHOLDER: char = '#';

/// Cores left free for the caller (UI thread, I/O) when the worker count is
/// resolved automatically.
pub const RESERVED_CORES: usize = 2;

/// Name prefix for batch worker threads.
pub const WORKER_THREAD_PREFIX: &str = "exrmerge-worker";
