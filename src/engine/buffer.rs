//! Audio Buffer Management
//!
//! Provides the multi-channel buffer type the shaping pipeline operates on
//! together with level measurement helpers.

use crate::error::{Result, ShaperError};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns `f32::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate the RMS level of an audio buffer in dB
///
/// Returns `f32::NEG_INFINITY` for empty or silent buffers.
pub fn calculate_rms(buffer: &AudioBuffer) -> f32 {
    let total_samples = buffer.num_channels() * buffer.num_samples();
    if total_samples == 0 {
        return f32::NEG_INFINITY;
    }

    let sum_squares: f64 = buffer
        .iter_samples()
        .map(|s| (s as f64) * (s as f64))
        .sum();

    let rms = (sum_squares / total_samples as f64).sqrt() as f32;
    linear_to_db(rms)
}

/// Calculate the peak level of an audio buffer in dB
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    linear_to_db(buffer.peak())
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for the shaping pipeline
///
/// Stores audio as non-interleaved 32-bit floating point samples with shape
/// `(channels, samples)`. Every channel has the same length and the sample
/// rate never changes once the buffer exists. Operations that transform
/// audio return a new buffer and leave `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer with the given shape
    pub fn new(num_channels: usize, num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
            sample_rate,
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// Fails if there are no channels or the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(ShaperError::EmptyAudio);
        };

        let expected = (channels.len(), first.len());
        if let Some(bad) = channels.iter().find(|c| c.len() != first.len()) {
            return Err(ShaperError::ShapeMismatch {
                expected,
                actual: (channels.len(), bad.len()),
            });
        }

        Ok(Self {
            samples: channels,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved sample data (L, R, L, R, ... for stereo)
    ///
    /// No samples gives an empty buffer that still has `num_channels` channels.
    pub fn from_interleaved(
        interleaved: &[f32],
        num_channels: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if num_channels == 0 {
            return Err(ShaperError::EmptyAudio);
        }

        if interleaved.len() % num_channels != 0 {
            return Err(ShaperError::ShapeMismatch {
                expected: (num_channels, interleaved.len() / num_channels),
                actual: (num_channels, interleaved.len()),
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for (i, sample) in interleaved.iter().enumerate() {
            samples[i % num_channels].push(*sample);
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Interleave channels into a single frame-ordered vector
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.num_samples();
        let mut result = Vec::with_capacity(frames * self.num_channels());

        for frame in 0..frames {
            for channel in &self.samples {
                result.push(channel[frame]);
            }
        }

        result
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// Shape as `(channels, samples)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_channels(), self.num_samples())
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// Iterate over channels
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.iter().map(Vec::as_slice)
    }

    /// Iterate over every sample of every channel
    pub fn iter_samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().flat_map(|c| c.iter().copied())
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.iter_samples().map(f32::abs).fold(0.0_f32, f32::max)
    }

    /// Check if every sample is finite
    pub fn is_finite(&self) -> bool {
        self.iter_samples().all(f32::is_finite)
    }

    /// Apply `f` to every sample, producing a new buffer of the same shape
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            samples: self
                .samples
                .iter()
                .map(|c| c.iter().map(|&s| f(s)).collect())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Apply `f` to each channel, producing a new buffer
    ///
    /// `f` must return a vector of the same length as its input channel.
    pub fn map_channels(&self, f: impl Fn(&[f32]) -> Vec<f32>) -> Self {
        Self {
            samples: self.samples.iter().map(|c| f(c.as_slice())).collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Multiply every sample by `gain`
    pub fn scaled(&self, gain: f32) -> Self {
        self.map(|s| s * gain)
    }

    /// Elementwise sum of several buffers of identical shape
    pub fn sum(buffers: &[&AudioBuffer]) -> Result<Self> {
        let Some(first) = buffers.first() else {
            return Err(ShaperError::EmptyAudio);
        };

        let mut samples = first.samples.clone();
        for other in &buffers[1..] {
            if other.shape() != first.shape() {
                return Err(ShaperError::ShapeMismatch {
                    expected: first.shape(),
                    actual: other.shape(),
                });
            }
            for (acc, src) in samples.iter_mut().zip(&other.samples) {
                for (a, s) in acc.iter_mut().zip(src) {
                    *a += s;
                }
            }
        }

        Ok(Self {
            samples,
            sample_rate: first.sample_rate,
        })
    }

    /// Check if two buffers match sample-for-sample within `tolerance`
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.shape() == other.shape()
            && self
                .iter_samples()
                .zip(other.iter_samples())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

// ============================================================================
// Tests
// ============================================================================
