//! Biquad filter primitives
//!
//! Second-order IIR low-pass, high-pass and band-pass filters designed with
//! the Audio EQ Cookbook formulas. Each application starts from zero state
//! and runs every channel independently, so a filter is a pure function of
//! its input buffer.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::{Result, ShaperError};

/// Q used for low-pass/high-pass stages and band-pass when none is given
pub const DEFAULT_Q: f64 = 0.707;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
    /// Keep a band around the center frequency (0 dB peak gain)
    BandPass,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::LowPass => "low-pass",
            FilterKind::HighPass => "high-pass",
            FilterKind::BandPass => "band-pass",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, PartialEq)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    /// Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html
    fn calculate(kind: FilterKind, sample_rate: f64, frequency: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::LowPass => (
                (1.0 - cos_w0) / 2.0,
                1.0 - cos_w0,
                (1.0 - cos_w0) / 2.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            FilterKind::HighPass => (
                (1.0 + cos_w0) / 2.0,
                -(1.0 + cos_w0),
                (1.0 + cos_w0) / 2.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            FilterKind::BandPass => (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha),
        };

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Biquad filter state for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    /// Direct Form I
    fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// An immutable, validated filter descriptor bound to a sample rate
///
/// Construction fails with [`ShaperError::InvalidFilter`] unless
/// `0 < frequency < sample_rate / 2` and `q` is finite and positive.
/// Frequencies at or past Nyquist are rejected rather than clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    kind: FilterKind,
    sample_rate: u32,
    frequency_hz: f64,
    q: f64,
    coeffs: BiquadCoeffs,
}

impl Biquad {
    pub fn new(kind: FilterKind, sample_rate: u32, frequency_hz: f64, q: f64) -> Result<Self> {
        let invalid = |reason: &str| ShaperError::InvalidFilter {
            kind: kind.as_str(),
            frequency_hz,
            sample_rate,
            reason: reason.to_string(),
        };

        if sample_rate == 0 {
            return Err(invalid("sample rate must be positive"));
        }
        let nyquist = sample_rate as f64 / 2.0;
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(invalid("frequency must be positive"));
        }
        if frequency_hz >= nyquist {
            return Err(invalid("frequency must be below Nyquist"));
        }
        if !q.is_finite() || q <= 0.0 {
            return Err(invalid("Q must be positive"));
        }

        Ok(Self {
            kind,
            sample_rate,
            frequency_hz,
            q,
            coeffs: BiquadCoeffs::calculate(kind, sample_rate as f64, frequency_hz, q),
        })
    }

    pub fn lowpass(sample_rate: u32, cutoff_hz: f64) -> Result<Self> {
        Self::new(FilterKind::LowPass, sample_rate, cutoff_hz, DEFAULT_Q)
    }

    pub fn highpass(sample_rate: u32, cutoff_hz: f64) -> Result<Self> {
        Self::new(FilterKind::HighPass, sample_rate, cutoff_hz, DEFAULT_Q)
    }

    pub fn bandpass(sample_rate: u32, center_hz: f64, q: f64) -> Result<Self> {
        Self::new(FilterKind::BandPass, sample_rate, center_hz, q)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    /// Filter one channel from zero initial state
    pub fn filter_channel(&self, input: &[f32]) -> Vec<f32> {
        let mut state = BiquadState::default();
        input
            .iter()
            .map(|&x| state.process(x as f64, &self.coeffs) as f32)
            .collect()
    }

    /// Filter every channel of `buffer`, returning a new buffer of the same shape
    pub fn apply(&self, buffer: &AudioBuffer) -> AudioBuffer {
        buffer.map_channels(|channel| self.filter_channel(channel))
    }
}

// ============================================================================
// Free-function primitives
// ============================================================================

/// Second-order low-pass at `cutoff_hz` (Q = 0.707)
pub fn apply_lowpass(buffer: &AudioBuffer, sample_rate: u32, cutoff_hz: f64) -> Result<AudioBuffer> {
    Ok(Biquad::lowpass(sample_rate, cutoff_hz)?.apply(buffer))
}

/// Second-order high-pass at `cutoff_hz` (Q = 0.707)
pub fn apply_highpass(buffer: &AudioBuffer, sample_rate: u32, cutoff_hz: f64) -> Result<AudioBuffer> {
    Ok(Biquad::highpass(sample_rate, cutoff_hz)?.apply(buffer))
}

/// Second-order band-pass centered on `center_hz`; `q` defaults to 0.707
pub fn apply_bandpass(
    buffer: &AudioBuffer,
    sample_rate: u32,
    center_hz: f64,
    q: Option<f64>,
) -> Result<AudioBuffer> {
    Ok(Biquad::bandpass(sample_rate, center_hz, q.unwrap_or(DEFAULT_Q))?.apply(buffer))
}

// ============================================================================
// Tests
// ============================================================================
