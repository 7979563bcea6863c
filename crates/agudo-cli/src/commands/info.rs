//! WAV metadata command.

use agudo_io::{WavFormat, read_wav_info};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// WAV file to inspect
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.input)?;

    let format = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE float",
    };

    println!("{}", args.input.display());
    println!("  Channels:    {}", info.channels);
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Bit depth:   {} ({})", info.bits_per_sample, format);
    println!("  Frames:      {}", info.num_frames);
    println!("  Duration:    {:.2}s", info.duration_secs);

    Ok(())
}
