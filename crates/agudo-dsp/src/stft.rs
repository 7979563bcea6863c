//! Short-time Fourier transform with overlap-add resynthesis.
//!
//! Segments a signal into overlapping Hann-windowed frames, transforms
//! each via [`Fft`], and reconstructs signals from modified spectrograms
//! by windowed overlap-add. The overlap-add output is normalized per
//! sample by the accumulated squared-window energy, which keeps the
//! resynthesis gain-correct for any hop smaller than the window.

use crate::fft::Fft;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;

/// A spectrogram: one half-spectrum of `fft_size/2 + 1` complex bins per
/// analysis hop, in time order.
pub type Spectrogram = Vec<Vec<Complex<f32>>>;

/// STFT processor with a fixed transform size and hop.
pub struct Stft {
    fft_size: usize,
    hop_size: usize,
    fft: Fft,
    window: Vec<f32>,
}

impl Stft {
    /// Create a new STFT processor.
    ///
    /// # Panics
    ///
    /// Panics if `hop_size` is zero or not smaller than `fft_size`;
    /// overlap-add requires overlapping frames.
    pub fn new(fft_size: usize, hop_size: usize) -> Self {
        assert!(hop_size > 0, "hop size must be positive");
        assert!(
            hop_size < fft_size,
            "hop size must be smaller than FFT size"
        );

        let fft = Fft::new(fft_size);

        // Hann window, symmetric form
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (fft_size - 1) as f32).cos()))
            .collect();

        Self {
            fft_size,
            hop_size,
            fft,
            window,
        }
    }

    /// Get the transform size.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get the hop size between frames.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of frequency bins per frame (`fft_size / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of frames produced for a signal of the given length.
    ///
    /// Signals shorter than one frame produce zero frames.
    pub fn num_frames(&self, signal_len: usize) -> usize {
        if signal_len >= self.fft_size {
            (signal_len - self.fft_size) / self.hop_size + 1
        } else {
            0
        }
    }

    /// Forward STFT: signal to spectrogram.
    ///
    /// Frame `i` covers samples `[i*hop, i*hop + fft_size)`, zero-padded
    /// past the end of the signal, windowed, then transformed.
    pub fn forward(&self, signal: &[f32]) -> Spectrogram {
        let num_frames = self.num_frames(signal.len());
        let mut spectrogram = Vec::with_capacity(num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop_size;
            let end = (start + self.fft_size).min(signal.len());

            // Extract frame, zero-padding past the signal end
            let mut frame: Vec<f32> = signal[start..end].to_vec();
            frame.resize(self.fft_size, 0.0);

            for (sample, &coeff) in frame.iter_mut().zip(self.window.iter()) {
                *sample *= coeff;
            }

            spectrogram.push(self.fft.forward(&frame));
        }

        spectrogram
    }

    /// Inverse STFT: spectrogram to signal via windowed overlap-add.
    ///
    /// Output length is `(num_frames - 1) * hop + fft_size`; an empty
    /// spectrogram yields an empty signal. Each inverse-transformed frame
    /// is multiplied by the analysis window again and accumulated at its
    /// hop offset; the result is divided per sample by the accumulated
    /// squared-window energy wherever that energy is nonzero.
    pub fn inverse(&self, spectrogram: &[Vec<Complex<f32>>]) -> Vec<f32> {
        if spectrogram.is_empty() {
            return Vec::new();
        }

        let num_frames = spectrogram.len();
        let output_len = (num_frames - 1) * self.hop_size + self.fft_size;
        let mut output = vec![0.0f32; output_len];
        let mut window_sum = vec![0.0f32; output_len];

        for (frame_idx, spectrum) in spectrogram.iter().enumerate() {
            let frame = self.fft.inverse(spectrum);
            let start = frame_idx * self.hop_size;

            for i in 0..self.fft_size {
                output[start + i] += frame[i] * self.window[i];
                window_sum[start + i] += self.window[i] * self.window[i];
            }
        }

        // Normalize by accumulated window energy to restore amplitude
        for (sample, &energy) in output.iter_mut().zip(window_sum.iter()) {
            if energy > 0.0 {
                *sample /= energy;
            }
        }

        output
    }
}
