//! Audio file I/O for the agudo bandwidth extension toolkit.
//!
//! This crate provides WAV reading and writing on top of [`hound`],
//! exchanging audio with the DSP layer as [`StereoSamples`] buffers:
//!
//! - [`read_wav_stereo`] / [`write_wav_stereo`] for loading and saving
//!   stereo audio (mono input is expanded to both channels)
//! - [`read_wav_info`] for metadata without loading sample data
//!
//! ```rust,ignore
//! use agudo_io::{read_wav_stereo, write_wav_stereo};
//!
//! let (samples, spec) = read_wav_stereo("input.wav")?;
//! // ... process ...
//! write_wav_stereo("output.wav", &samples, spec)?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, read_wav_info, read_wav_stereo, write_wav_stereo};

pub use agudo_dsp::StereoSamples;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
