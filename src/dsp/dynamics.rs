//! Post-processing: compression and peak normalization
//!
//! Applied identically after every instrument recipe. Samples above the
//! threshold are pulled toward it by a fixed ratio; the result is then
//! scaled so the loudest sample lands at (just under) full scale.

use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::{Result, ShaperError};

/// Default compression threshold (linear amplitude)
pub const DEFAULT_THRESHOLD: f32 = 0.3;
/// Default compression ratio (4:1)
pub const DEFAULT_RATIO: f32 = 4.0;
/// Added to the peak before dividing so silence stays silent
pub const DEFAULT_NORMALIZE_EPSILON: f32 = 1e-6;

// ============================================================================
// Compression
// ============================================================================

/// Static, memoryless compressor operating on linear sample magnitudes
///
/// For `|x| > threshold` the output is
/// `sign(x) * (threshold + (|x| - threshold) / ratio)`; smaller samples pass
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftKneeCompressor {
    pub threshold: f32,
    pub ratio: f32,
}

impl Default for SoftKneeCompressor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ratio: DEFAULT_RATIO,
        }
    }
}

impl SoftKneeCompressor {
    pub fn new(threshold: f32, ratio: f32) -> Result<Self> {
        let comp = Self { threshold, ratio };
        comp.validate()?;
        Ok(comp)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ShaperError::Config {
                reason: format!("compression threshold must be >= 0, got {}", self.threshold),
            });
        }
        if !self.ratio.is_finite() || self.ratio < 1.0 {
            return Err(ShaperError::Config {
                reason: format!("compression ratio must be >= 1, got {}", self.ratio),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn compress_sample(&self, sample: f32) -> f32 {
        let magnitude = sample.abs();
        if magnitude > self.threshold {
            sample.signum() * (self.threshold + (magnitude - self.threshold) / self.ratio)
        } else {
            sample
        }
    }

    pub fn apply(&self, buffer: &AudioBuffer) -> AudioBuffer {
        buffer.map(|s| self.compress_sample(s))
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Divide every sample by `peak + epsilon`
///
/// An all-zero buffer stays all-zero.
pub fn peak_normalize(buffer: &AudioBuffer, epsilon: f32) -> AudioBuffer {
    let scale = buffer.peak() + epsilon;
    buffer.map(|s| s / scale)
}

/// The compression + normalization stage shared by all recipes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessor {
    pub compressor: SoftKneeCompressor,
    pub epsilon: f32,
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self {
            compressor: SoftKneeCompressor::default(),
            epsilon: DEFAULT_NORMALIZE_EPSILON,
        }
    }
}

impl PostProcessor {
    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        peak_normalize(&self.compressor.apply(buffer), self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mono(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::from_channels(vec![samples], 44100).unwrap()
    }

    #[test]
    fn test_below_threshold_passes_unchanged() {
        let comp = SoftKneeCompressor::default();
        for x in [0.0, 0.1, -0.2, 0.3, -0.3] {
            assert_eq!(comp.compress_sample(x), x);
        }
    }

    #[test]
    fn test_above_threshold_is_reduced() {
        let comp = SoftKneeCompressor::default();
        // 0.3 + (0.7 / 4) = 0.475
        assert_relative_eq!(comp.compress_sample(1.0), 0.475, epsilon = 1e-6);
        assert_relative_eq!(comp.compress_sample(-1.0), -0.475, epsilon = 1e-6);
        assert_relative_eq!(comp.compress_sample(2.3), 0.8, epsilon = 1e-6);

        for x in [0.31_f32, 0.5, 0.9, 3.0, -0.4, -7.5] {
            let y = comp.compress_sample(x);
            assert!(y.abs() < x.abs());
            assert!(y.abs() <= 0.3 + (x.abs() - 0.3) / 4.0 + 1e-6);
            assert_eq!(y.signum(), x.signum());
        }
    }

    #[test]
    fn test_normalize_peak_is_near_one() {
        let out = peak_normalize(&mono(vec![0.1, -0.4, 0.2]), DEFAULT_NORMALIZE_EPSILON);
        assert_relative_eq!(out.peak(), 1.0, epsilon = 1e-5);
        assert!(out.peak() < 1.0);
        assert_relative_eq!(out.channel(0).unwrap()[0], 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_normalize_silence_stays_zero() {
        let silent = AudioBuffer::new(2, 64, 44100);
        let out = peak_normalize(&silent, DEFAULT_NORMALIZE_EPSILON);
        assert!(out.is_finite());
        assert!(out.iter_samples().all(|s| s == 0.0));
    }

    #[test]
    fn test_post_processor_bounds_output() {
        let hot = mono(vec![5.0, -3.0, 0.1, 0.0, 12.0]);
        let out = PostProcessor::default().process(&hot);
        assert_eq!(out.shape(), hot.shape());
        assert!(out.peak() <= 1.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(SoftKneeCompressor::new(0.3, 0.5).is_err());
        assert!(SoftKneeCompressor::new(-0.1, 4.0).is_err());
        assert!(SoftKneeCompressor::new(0.3, 4.0).is_ok());
    }
}
