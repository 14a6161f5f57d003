//! Spectral energy measurement
//!
//! Used to check where a shaped stem's energy ended up.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::engine::buffer::AudioBuffer;

/// Fraction of positive-frequency energy that lies below `cutoff_hz`
///
/// Each channel is transformed with a single full-length FFT; per-bin
/// energies are summed across channels. Returns 0.0 for silent or empty
/// buffers.
pub fn energy_fraction_below(buffer: &AudioBuffer, cutoff_hz: f64) -> f64 {
    let n = buffer.num_samples();
    if n == 0 {
        return 0.0;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let bin_hz = buffer.sample_rate() as f64 / n as f64;

    let mut below = 0.0;
    let mut total = 0.0;

    for channel in buffer.channels() {
        let mut spectrum: Vec<Complex<f64>> =
            channel.iter().map(|&s| Complex::new(s as f64, 0.0)).collect();
        fft.process(&mut spectrum);

        for (bin, value) in spectrum.iter().take(n / 2 + 1).enumerate() {
            let energy = value.norm_sqr();
            total += energy;
            if (bin as f64) * bin_hz < cutoff_hz {
                below += energy;
            }
        }
    }

    if total > 0.0 {
        below / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency: f32, sample_rate: u32) -> AudioBuffer {
        let samples = (0..sample_rate as usize)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioBuffer::from_channels(vec![samples], sample_rate).unwrap()
    }

    #[test]
    fn test_low_tone_is_below_cutoff() {
        assert!(energy_fraction_below(&tone(100.0, 8000), 400.0) > 0.99);
    }

    #[test]
    fn test_high_tone_is_above_cutoff() {
        assert!(energy_fraction_below(&tone(2000.0, 8000), 400.0) < 0.01);
    }

    #[test]
    fn test_silence_is_zero() {
        let silent = AudioBuffer::new(2, 1024, 44100);
        assert_eq!(energy_fraction_below(&silent, 400.0), 0.0);
    }
}
