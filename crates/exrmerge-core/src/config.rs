use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExrMergeError, Result};
use crate::jobs::InputFile;

/// Batch description loaded from TOML.
///
/// ```toml
/// output = "comp/shot_####.exr"
/// threads = 0
///
/// [[sequences]]
/// files = ["beauty/shot_0001.exr", "beauty/shot_0002.exr"]
/// channels = ["R", "G", "B", "A"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Output path template.
    pub output: String,
    /// Worker count, 0 for automatic.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub sequences: Vec<SequenceConfig>,
}

/// A set of files sharing one channel selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub channels: Vec<String>,
    /// Channel category labels, expanded against the first file by the CLI.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl BatchConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ExrMergeError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ExrMergeError::Config(e.to_string()))
    }

    /// Reject configs that would produce an empty batch.
    pub fn validate(&self) -> Result<()> {
        if self.output.is_empty() {
            return Err(ExrMergeError::Config("output template is empty".into()));
        }
        if self.sequences.iter().all(|s| s.files.is_empty()) {
            return Err(ExrMergeError::NoInput);
        }
        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.sequences.iter().map(|s| s.files.len()).sum()
    }

    /// Flatten sequences into batch inputs, in declaration order.
    pub fn input_files(&self) -> Vec<InputFile> {
        self.sequences
            .iter()
            .flat_map(|seq| {
                seq.files
                    .iter()
                    .map(move |path| InputFile::new(path.clone(), seq.channels.iter().cloned()))
            })
            .collect()
    }

    /// Example config written by `exrmerge config`.
    pub fn sample() -> Self {
        Self {
            output: "comp/shot_####.exr".into(),
            threads: 0,
            sequences: vec![
                SequenceConfig {
                    files: vec![
                        PathBuf::from("beauty/shot_0001.exr"),
                        PathBuf::from("beauty/shot_0002.exr"),
                    ],
                    channels: vec!["R".into(), "G".into(), "B".into(), "A".into()],
                    categories: vec![],
                },
                SequenceConfig {
                    files: vec![
                        PathBuf::from("aovs/shot_0001.exr"),
                        PathBuf::from("aovs/shot_0002.exr"),
                    ],
                    channels: vec!["Z".into()],
                    categories: vec!["Normal (N)".into()],
                },
            ],
        }
    }
}
