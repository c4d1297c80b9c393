use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::frame_id::{frame_id, FrameLabel};

/// One caller-supplied input: a file path plus the channel names to keep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub channels: Vec<String>,
}

impl InputFile {
    pub fn new<I, S>(path: impl Into<PathBuf>, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }
}

/// A file scheduled inside a frame job.
#[derive(Clone, Debug)]
pub struct SourceFile {
    path: PathBuf,
    requested: HashSet<String>,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the channel `name` should be taken from this file.
    pub fn wants(&self, name: &str) -> bool {
        self.requested.contains(name)
    }

    pub fn requested_count(&self) -> usize {
        self.requested.len()
    }
}

impl From<InputFile> for SourceFile {
    fn from(input: InputFile) -> Self {
        Self {
            path: input.path,
            requested: input.channels.into_iter().collect(),
        }
    }
}

/// All files sharing one frame number, merged into a single output.
#[derive(Clone, Debug)]
pub struct FrameJob {
    pub frame: Option<u32>,
    pub files: Vec<SourceFile>,
}

impl FrameJob {
    pub fn label(&self) -> FrameLabel {
        FrameLabel(self.frame)
    }
}

/// Bucket key for grouping. Numbered frames order before the unnumbered
/// bucket, so the two never collide even at `u32::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameKey {
    Numbered(u32),
    Unnumbered,
}

impl FrameKey {
    pub fn frame(self) -> Option<u32> {
        match self {
            Self::Numbered(n) => Some(n),
            Self::Unnumbered => None,
        }
    }
}

impl From<Option<u32>> for FrameKey {
    fn from(frame: Option<u32>) -> Self {
        frame.map_or(Self::Unnumbered, Self::Numbered)
    }
}

/// Group inputs by inferred frame number.
///
/// Jobs come out ascending by frame, unnumbered last. Within a job, files
/// keep their input order; duplicate paths are kept as separate files.
pub fn build_jobs<I>(inputs: I) -> Vec<FrameJob>
where
    I: IntoIterator<Item = InputFile>,
{
    let mut buckets: BTreeMap<FrameKey, Vec<SourceFile>> = BTreeMap::new();

    for input in inputs {
        let key = FrameKey::from(frame_id(&input.path.to_string_lossy()));
        buckets.entry(key).or_default().push(SourceFile::from(input));
    }

    buckets
        .into_iter()
        .map(|(key, files)| FrameJob {
            frame: key.frame(),
            files,
        })
        .collect()
}
