//! Stereo sample buffers and mid/side conversion.
//!
//! [`StereoSamples`] is the interchange type for whole-buffer stereo
//! audio; the mid/side helpers implement the lossless linear transform
//! the extension engine assumes (`mid = (L+R)/2`, `side = (L-R)/2`).

/// A pair of stereo audio buffers (left and right channels).
#[derive(Debug, Clone)]
pub struct StereoSamples {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Create new stereo samples from left and right channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "Channels must have same length");
        Self { left, right }
    }

    /// Create stereo samples from mono by duplicating to both channels.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            left: mono.clone(),
            right: mono,
        }
    }

    /// Get the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Convert to interleaved format (L, R, L, R, ...).
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.left.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            interleaved.push(*l);
            interleaved.push(*r);
        }
        interleaved
    }

    /// Create from interleaved format (L, R, L, R, ...).
    pub fn from_interleaved(interleaved: &[f32]) -> Self {
        let len = interleaved.len() / 2;
        let mut left = Vec::with_capacity(len);
        let mut right = Vec::with_capacity(len);

        for chunk in interleaved.chunks(2) {
            if chunk.len() == 2 {
                left.push(chunk[0]);
                right.push(chunk[1]);
            }
        }

        Self { left, right }
    }

    /// Encode to mid/side.
    pub fn to_mid_side(&self) -> (Vec<f32>, Vec<f32>) {
        encode_mid_side(&self.left, &self.right)
    }

    /// Decode from mid/side.
    pub fn from_mid_side(mid: &[f32], side: &[f32]) -> Self {
        let (left, right) = decode_mid_side(mid, side);
        Self { left, right }
    }
}

/// Encode left/right to mid/side: `mid = (L+R)/2`, `side = (L-R)/2`.
pub fn encode_mid_side(left: &[f32], right: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mid = left
        .iter()
        .zip(right.iter())
        .map(|(l, r)| (l + r) * 0.5)
        .collect();
    let side = left
        .iter()
        .zip(right.iter())
        .map(|(l, r)| (l - r) * 0.5)
        .collect();
    (mid, side)
}

/// Decode mid/side back to left/right: `L = mid + side`, `R = mid - side`.
pub fn decode_mid_side(mid: &[f32], side: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let left = mid
        .iter()
        .zip(side.iter())
        .map(|(m, s)| m + s)
        .collect();
    let right = mid
        .iter()
        .zip(side.iter())
        .map(|(m, s)| m - s)
        .collect();
    (left, right)
}
