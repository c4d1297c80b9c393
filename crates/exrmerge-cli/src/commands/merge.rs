use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use exrmerge_core::batch::{submit, BatchInput};
use exrmerge_core::codec::{Codec, ExrCodec};
use exrmerge_core::config::{BatchConfig, SequenceConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::categories::{is_known, select_channels};
use crate::summary::{print_batch_summary, print_report};

/// Longest wait between progress redraws when no worker reports.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args)]
pub struct MergeArgs {
    /// Input EXR files, merged as one sequence
    pub files: Vec<PathBuf>,

    /// Batch config file (TOML)
    #[arg(long, conflicts_with_all = ["files", "channels", "categories"])]
    pub config: Option<PathBuf>,

    /// Comma-separated channel names to keep
    #[arg(short, long, value_delimiter = ',')]
    pub channels: Vec<String>,

    /// Keep every channel of a category, e.g. "Depth (Z)" (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Output path template; the last run of '#' receives the frame number
    #[arg(short, long)]
    pub output: Option<String>,

    /// Worker threads (0 = all cores but two)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Reject inputs with minor header inconsistencies
    #[arg(long)]
    pub pedantic: bool,
}

fn build_config(args: &MergeArgs) -> Result<BatchConfig> {
    let mut config = if let Some(ref config_path) = args.config {
        BatchConfig::load(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?
    } else {
        let Some(ref output) = args.output else {
            bail!("--output is required without --config");
        };
        BatchConfig {
            output: output.clone(),
            threads: 0,
            sequences: vec![SequenceConfig {
                files: args.files.clone(),
                channels: args.channels.clone(),
                categories: args.categories.clone(),
            }],
        }
    };

    if let Some(ref output) = args.output {
        config.output = output.clone();
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }

    config.validate()?;
    Ok(config)
}

/// Add the channels named by each sequence's categories, looked up in the
/// header of its first file.
fn expand_categories<C: Codec>(codec: &C, config: &mut BatchConfig) -> Result<()> {
    for sequence in &mut config.sequences {
        if sequence.categories.is_empty() {
            continue;
        }
        if let Some(unknown) = sequence.categories.iter().find(|l| !is_known(l)) {
            bail!("Unknown channel category \"{unknown}\"");
        }
        let Some(first) = sequence.files.first() else {
            continue;
        };

        let header = codec
            .read_header(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;
        let selected = select_channels(&sequence.categories, &codec.channels(&header));
        debug!(file = %first.display(), channels = ?selected, "Expanded categories");

        for name in selected {
            if !sequence.channels.contains(&name) {
                sequence.channels.push(name);
            }
        }
    }
    Ok(())
}

pub fn run(args: &MergeArgs) -> Result<()> {
    let codec = Arc::new(ExrCodec {
        pedantic: args.pedantic,
    });
    let mut config = build_config(args)?;
    expand_categories(codec.as_ref(), &mut config)?;

    print_batch_summary(&config);

    let (tx, rx) = mpsc::channel::<()>();
    let input = BatchInput::new(config.input_files(), config.output.clone())
        .with_threads(config.threads)
        .with_progress(move |_| {
            let _ = tx.send(());
        });

    let started = Instant::now();
    let run = submit(codec, input)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40}] {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    pb.set_message("Merging");

    loop {
        let progress = run.poll();
        pb.set_length(progress.max as u64);
        pb.set_position(progress.done as u64);
        pb.set_message(format!("Merging {:>3.0}%", progress.fraction() * 100.0));
        if progress.finished {
            break;
        }
        let _ = rx.recv_timeout(POLL_INTERVAL);
    }
    pb.finish_with_message("Done");

    let jobs = run.job_count();
    let report = run.wait();
    print_report(&report, jobs, started.elapsed());

    if !report.is_success() {
        bail!("{} of {} frame(s) failed", report.errors.len(), jobs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MergeArgs {
        MergeArgs {
            files: vec![PathBuf::from("a_0001.exr"), PathBuf::from("a_0002.exr")],
            config: None,
            channels: vec!["R".into(), "G".into()],
            categories: vec![],
            output: Some("out_####.exr".into()),
            threads: Some(3),
            pedantic: false,
        }
    }

    #[test]
    fn test_build_config_from_args() {
        let config = build_config(&args()).unwrap();
        assert_eq!(config.output, "out_####.exr");
        assert_eq!(config.threads, 3);
        assert_eq!(config.sequences.len(), 1);
        assert_eq!(config.file_count(), 2);
        assert_eq!(config.sequences[0].channels, vec!["R", "G"]);
    }

    #[test]
    fn test_output_required_without_config() {
        let mut a = args();
        a.output = None;
        assert!(build_config(&a).is_err());
    }

    #[test]
    fn test_no_files_rejected() {
        let mut a = args();
        a.files.clear();
        assert!(build_config(&a).is_err());
    }

    #[test]
    fn test_config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, BatchConfig::sample().to_toml_string().unwrap()).unwrap();

        let a = MergeArgs {
            files: vec![],
            config: Some(path),
            channels: vec![],
            categories: vec![],
            output: Some("other_##.exr".into()),
            threads: None,
            pedantic: true,
        };
        let config = build_config(&a).unwrap();
        assert_eq!(config.output, "other_##.exr");
        assert_eq!(config.threads, 0);
        assert_eq!(config.file_count(), 4);
    }

    #[derive(clap::Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: MergeArgs,
    }

    #[test]
    fn test_parse_flags() {
        use clap::Parser;

        let parsed = Wrapper::try_parse_from([
            "merge",
            "a_0001.exr",
            "-o",
            "out_####.exr",
            "-c",
            "R,G,B",
            "--pedantic",
        ])
        .unwrap();
        assert!(parsed.args.pedantic);
        assert_eq!(parsed.args.channels, vec!["R", "G", "B"]);

        let parsed = Wrapper::try_parse_from(["merge", "a_0001.exr", "-o", "o_#.exr"]).unwrap();
        assert!(!parsed.args.pedantic);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut config = build_config(&args()).unwrap();
        config.sequences[0].categories = vec!["Bogus".into()];
        let err = expand_categories(&ExrCodec::new(), &mut config).unwrap_err();
        assert!(err.to_string().contains("Bogus"));
    }
}
