//! High-frequency restoration command.

use agudo_dsp::{BandwidthExtender, ExtendParams, StereoSamples, resample};
use agudo_io::{WavSpec, read_wav_stereo, write_wav_stereo};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct RestoreArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Cutoff frequency in Hz; content above this is synthesized
    #[arg(short, long, default_value = "16000")]
    cutoff: f32,

    /// Upsample factor applied before extension (1 = keep input rate)
    #[arg(short, long, default_value = "2")]
    upsample: u32,

    /// Tune for lossy-compressed source material
    #[arg(long)]
    compressed: bool,

    /// Seed for the synthesis jitter (same seed = same output)
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: RestoreArgs) -> anyhow::Result<()> {
    if args.upsample == 0 {
        anyhow::bail!("Upsample factor must be at least 1");
    }
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Bit depth must be 16, 24, or 32 (got {})", args.bit_depth);
    }

    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav_stereo(&args.input)?;

    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f32 / spec.sample_rate as f32
    );

    // Upsample first so there is spectrum above the source Nyquist to
    // put synthesized content in
    let sample_rate = spec.sample_rate * args.upsample;
    let samples = if args.upsample > 1 {
        println!(
            "Upsampling {} Hz -> {} Hz ({}x)...",
            spec.sample_rate, sample_rate, args.upsample
        );
        StereoSamples::new(
            resample::resample(&samples.left, spec.sample_rate, sample_rate),
            resample::resample(&samples.right, spec.sample_rate, sample_rate),
        )
    } else {
        samples
    };

    let (mid, side) = samples.to_mid_side();

    let extender = BandwidthExtender::default();
    let params = ExtendParams {
        sample_rate,
        cutoff_hz: args.cutoff,
        compressed: args.compressed,
        seed: args.seed,
    };

    println!(
        "Extending above {} Hz ({} frames)...",
        args.cutoff,
        extender_frames(&extender, mid.len())
    );

    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({eta})")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut report = |p: f32| pb.set_position((p * 1000.0) as u64);
    let (mid, side) = extender.extend(&mid, &side, &params, Some(&mut report));
    pb.finish_with_message("done");

    let restored = StereoSamples::from_mid_side(&mid, &side);

    // Stats
    let input_peak = peak(&samples.left).max(peak(&samples.right));
    let output_peak = peak(&restored.left).max(peak(&restored.right));
    println!("\nStats:");
    println!("  Input peak:  {:.1} dB", linear_to_db(input_peak));
    println!("  Output peak: {:.1} dB", linear_to_db(output_peak));

    let out_spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &restored, out_spec)?;
    println!("Done!");

    Ok(())
}

fn extender_frames(extender: &BandwidthExtender, signal_len: usize) -> usize {
    if signal_len >= extender.fft_size() {
        (signal_len - extender.fft_size()) / extender.hop_size() + 1
    } else {
        0
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agudo_io::read_wav_info;
    use std::f32::consts::PI;
    use tempfile::NamedTempFile;

    fn write_test_input(path: &std::path::Path, sample_rate: u32, len: usize) {
        let signal: Vec<f32> = (0..len)
            .map(|i| (2.0 * PI * 1000.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        let samples = StereoSamples::new(signal.clone(), signal);
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
        };
        write_wav_stereo(path, &samples, spec).unwrap();
    }

    #[test]
    fn test_restore_pipeline_writes_upsampled_output() {
        let input = NamedTempFile::new().unwrap();
        let output = NamedTempFile::new().unwrap();
        write_test_input(input.path(), 44100, 22050);

        let args = RestoreArgs {
            input: input.path().to_path_buf(),
            output: output.path().to_path_buf(),
            cutoff: 16000.0,
            upsample: 2,
            compressed: false,
            seed: 0,
            bit_depth: 32,
        };
        run(args).unwrap();

        let info = read_wav_info(output.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 88200);
        assert!(info.num_frames > 0);
    }

    #[test]
    fn test_restore_rejects_unsupported_bit_depth() {
        let args = RestoreArgs {
            input: PathBuf::from("unused.wav"),
            output: PathBuf::from("unused-out.wav"),
            cutoff: 16000.0,
            upsample: 2,
            compressed: false,
            seed: 0,
            bit_depth: 0,
        };
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("Bit depth"));
    }

    #[test]
    fn test_restore_rejects_zero_upsample() {
        let args = RestoreArgs {
            input: PathBuf::from("unused.wav"),
            output: PathBuf::from("unused-out.wav"),
            cutoff: 16000.0,
            upsample: 0,
            compressed: false,
            seed: 0,
            bit_depth: 32,
        };
        assert!(run(args).is_err());
    }
}
