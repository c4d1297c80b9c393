use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::codec::{ChannelEntry, Codec};
use crate::error::MergeError;
use crate::jobs::FrameJob;
use crate::naming::output_path;

/// Channels collected for one frame, plus the header used as the encoding
/// template (the first file of the job).
pub struct MergedFrame<H, B> {
    pub template: H,
    pub channels: Vec<ChannelEntry<B>>,
}

/// Result of a successfully written frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub output: PathBuf,
    pub channels: usize,
}

/// Insert `entry` into a name-sorted channel set, replacing any entry with
/// the same name.
pub fn insert_channel<B>(set: &mut Vec<ChannelEntry<B>>, entry: ChannelEntry<B>) {
    match set.binary_search_by(|e| e.name.as_str().cmp(entry.name.as_str())) {
        Ok(index) => set[index] = entry,
        Err(index) => set.insert(index, entry),
    }
}

/// Load every file of `job` and collect its requested channels.
///
/// `loaded` is bumped once per successfully decoded file. Stops at the
/// first file that fails to parse or decode. Later files win when two
/// files provide the same channel name.
pub fn collect_channels<C: Codec>(
    codec: &C,
    job: &FrameJob,
    loaded: &AtomicUsize,
) -> Result<Option<MergedFrame<C::Header, C::Buffer>>, MergeError> {
    let mut template: Option<C::Header> = None;
    let mut channels: Vec<ChannelEntry<C::Buffer>> = Vec::new();

    for file in &job.files {
        let path = file.path();
        let header = codec.read_header(path).map_err(|source| MergeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = codec.decode(&header, path).map_err(|source| MergeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        loaded.fetch_add(1, Ordering::Relaxed);
        debug!(
            path = %path.display(),
            decoded = decoded.len(),
            requested = file.requested_count(),
            "Loaded source file"
        );

        for entry in decoded.into_iter().filter(|e| file.wants(&e.name)) {
            insert_channel(&mut channels, entry);
        }

        if template.is_none() {
            template = Some(header);
        }
    }

    Ok(template.map(|template| MergedFrame { template, channels }))
}

/// Merge one frame job and write it to the path derived from
/// `output_template`.
///
/// `progress` receives one tick per loaded file and one final tick when the
/// job ends, whatever the outcome. A codec panic is caught and reported as
/// [`MergeError::Panicked`]. Codec headers and buffers are dropped before
/// returning.
pub fn merge_frame<C: Codec>(
    codec: &C,
    job: &FrameJob,
    output_template: &str,
    progress: &AtomicUsize,
) -> Result<MergeOutcome, MergeError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        merge_and_encode(codec, job, output_template, progress)
    }))
    .unwrap_or_else(|_| Err(MergeError::Panicked { frame: job.label() }));
    progress.fetch_add(1, Ordering::Relaxed);
    result
}

fn merge_and_encode<C: Codec>(
    codec: &C,
    job: &FrameJob,
    output_template: &str,
    progress: &AtomicUsize,
) -> Result<MergeOutcome, MergeError> {
    let merged = match collect_channels(codec, job, progress)? {
        Some(merged) if !merged.channels.is_empty() => merged,
        _ => return Err(MergeError::NoChannels { frame: job.label() }),
    };

    let output = PathBuf::from(output_path(output_template, job.frame));
    let count = merged.channels.len();
    debug!(
        frame = %job.label(),
        channels = count,
        output = %output.display(),
        "Encoding merged frame"
    );

    codec
        .encode(&merged.template, merged.channels, &output)
        .map_err(|source| MergeError::Save {
            path: output.clone(),
            source,
        })?;

    Ok(MergeOutcome {
        output,
        channels: count,
    })
}
