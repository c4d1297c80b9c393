use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use exrmerge_core::codec::{Codec, ExrCodec};
use exrmerge_core::frame_id::{frame_id, FrameLabel};

use crate::categories::group_channels;

#[derive(Args)]
pub struct InfoArgs {
    /// Input EXR files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Reject files with minor header inconsistencies
    #[arg(long)]
    pub pedantic: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let codec = ExrCodec {
        pedantic: args.pedantic,
    };

    for path in &args.files {
        let header = codec
            .read_header(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let channels = codec.channels(&header);

        println!("File:        {}", path.display());
        println!(
            "Frame:       {}",
            FrameLabel(frame_id(&path.to_string_lossy()))
        );
        println!("Dimensions:  {}x{}", header.width(), header.height());
        println!("Compression: {:?}", header.encoding.compression);
        println!("Channels:    {}", channels.len());

        for (label, members) in group_channels(&channels) {
            println!("  {} ({})", label, members.len());
            for channel in members {
                println!("    {:<24}{}", channel.name, channel.pixel_type);
            }
        }
        println!();
    }

    Ok(())
}
