use std::path::PathBuf;

use thiserror::Error;

use crate::frame_id::FrameLabel;

/// Failure reported by an image codec.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header: {0}")]
    Header(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),
}

/// Failure of a single frame job. Recorded in the run's error log; never
/// fatal to the batch.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: CodecError },

    #[error("failed to load {}: {source}", .path.display())]
    Load { path: PathBuf, source: CodecError },

    #[error("frame {frame} has no channels")]
    NoChannels { frame: FrameLabel },

    #[error("failed to save {}: {source}", .path.display())]
    Save { path: PathBuf, source: CodecError },

    #[error("frame {frame} panicked")]
    Panicked { frame: FrameLabel },
}

#[derive(Error, Debug)]
pub enum ExrMergeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid batch config: {0}")]
    Config(String),

    #[error("Failed to spawn worker thread: {source}")]
    Spawn { source: std::io::Error },

    #[error("Batch has no input files")]
    NoInput,
}

pub type Result<T> = std::result::Result<T, ExrMergeError>;
