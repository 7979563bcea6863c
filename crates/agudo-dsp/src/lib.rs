//! Agudo DSP - Spectral engine for harmonic bandwidth extension
//!
//! This crate restores plausible high-frequency content to audio that has
//! been low-pass filtered or lossily compressed. It analyzes the harmonic
//! structure of the surviving low band and synthesizes new partials above
//! the cutoff that are consistent with it.
//!
//! - [`fft`] - Fixed-size real FFT wrapper (forward to half-spectrum,
//!   inverse by conjugate symmetry)
//! - [`stft`] - Short-time Fourier transform with Hann windowing and
//!   normalized overlap-add resynthesis
//! - [`extend`] - The harmonic extension engine: peak detection, harmonic
//!   filtering, overtone synthesis, smoothing, recomposition
//! - [`stereo`] - Stereo sample buffers and mid/side conversion
//! - [`resample`] - Linear-interpolation sample rate conversion
//!
//! ## Example
//!
//! ```rust,ignore
//! use agudo_dsp::{BandwidthExtender, ExtendParams, stereo};
//!
//! let (mid, side) = stereo::encode_mid_side(&left, &right);
//!
//! let extender = BandwidthExtender::default();
//! let params = ExtendParams {
//!     sample_rate: 44100,
//!     cutoff_hz: 16000.0,
//!     ..Default::default()
//! };
//! let (mid, side) = extender.extend(&mid, &side, &params, None);
//!
//! let (left, right) = stereo::decode_mid_side(&mid, &side);
//! ```

pub mod extend;
pub mod fft;
pub mod resample;
pub mod stereo;
pub mod stft;

// Re-export main types
pub use extend::{BandwidthExtender, ExtendParams};
pub use fft::Fft;
pub use stereo::StereoSamples;
pub use stft::{Spectrogram, Stft};
