pub mod batch;
pub mod codec;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame_id;
pub mod jobs;
pub mod merge;
pub mod naming;
