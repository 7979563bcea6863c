//! Linear-interpolation sample rate conversion.
//!
//! The extension engine wants headroom above the source Nyquist to put
//! synthesized content in, so inputs are typically upsampled 2x or 4x
//! before processing. Linear interpolation is enough here: the imaging
//! artifacts it leaves sit exactly in the band the engine overwrites.

/// Resample a signal from one rate to another by linear interpolation.
///
/// Returns the input unchanged when the rates match. Output length is
/// `floor(len * to_rate / from_rate)`.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (input.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let fraction = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < input.len() {
            input[src_idx] * (1.0 - fraction) + input[src_idx + 1] * fraction
        } else if src_idx < input.len() {
            input[src_idx]
        } else {
            0.0
        };
        output.push(sample);
    }

    output
}

/// Resample each channel of a multi-channel buffer.
pub fn resample_channels(channels: &[Vec<f32>], from_rate: u32, to_rate: u32) -> Vec<Vec<f32>> {
    channels
        .iter()
        .map(|ch| resample(ch, from_rate, to_rate))
        .collect()
}
