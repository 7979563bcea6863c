//! Fixed-size real FFT wrapper.
//!
//! Wraps rustfft to provide the two transforms the STFT layer needs:
//! a forward transform from a real frame to the non-redundant half
//! spectrum, and an inverse transform that rebuilds the negative
//! frequencies by conjugate symmetry.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// FFT processor with cached forward/inverse plans for a fixed size.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given transform size.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero. Powers of two are recommended for the
    /// underlying primitive but not required.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be positive");

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Get the transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform a forward FFT on real input.
    ///
    /// Input shorter than the transform size is zero-padded; longer input
    /// is truncated. Returns the non-redundant half spectrum: `size/2 + 1`
    /// bins from DC to Nyquist inclusive.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();

        // Pad or truncate to FFT size
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        // Return only positive frequencies (DC to Nyquist)
        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Perform an inverse FFT from a half spectrum back to a real frame.
    ///
    /// The negative-frequency bins are reconstructed by conjugate symmetry
    /// (`bin[N-i] = conj(bin[i])` for `1 <= i < N/2`). Input shorter than
    /// `size/2 + 1` is treated as zero above its length. Output is scaled
    /// by `1/N` and has length `size`.
    pub fn inverse(&self, spectrum: &[Complex<f32>]) -> Vec<f32> {
        let half = self.size / 2 + 1;
        let mut buffer = vec![Complex::new(0.0, 0.0); self.size];

        for (i, bin) in spectrum.iter().take(half).enumerate() {
            buffer[i] = *bin;
        }

        // Mirror for negative frequencies (conjugate symmetry)
        for i in 1..(self.size + 1) / 2 {
            buffer[self.size - i] = buffer[i].conj();
        }

        self.ifft.process(&mut buffer);

        // Normalize and extract real part
        let scale = 1.0 / self.size as f32;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_fft_roundtrip() {
        let fft = Fft::new(256);

        let input: Vec<f32> = (0..256)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / 256.0).sin())
            .collect();

        let spectrum = fft.forward(&input);
        assert_eq!(spectrum.len(), 129);

        let reconstructed = fft.inverse(&spectrum);
        assert_eq!(reconstructed.len(), 256);

        for (a, b) in input.iter().zip(reconstructed.iter()) {
            assert!((a - b).abs() < 0.01, "Mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);

        // DC bin should dominate
        let dc_mag = spectrum[0].norm();
        let other_mag: f32 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }

    #[test]
    fn test_forward_zero_pads_short_input() {
        let fft = Fft::new(128);
        let spectrum = fft.forward(&[1.0; 32]);
        assert_eq!(spectrum.len(), 65);
    }

    #[test]
    fn test_inverse_zero_pads_short_spectrum() {
        let fft = Fft::new(128);
        let frame = fft.inverse(&[Complex::new(128.0, 0.0)]);

        // A lone DC bin reconstructs a constant signal
        assert_eq!(frame.len(), 128);
        for &s in &frame {
            assert!((s - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_size_rejected() {
        let _ = Fft::new(0);
    }
}
