//! Integration Tests
//!
//! End-to-end tests for the stem shaping pipeline: file in, shaped file out.

use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use hound::{SampleFormat, WavSpec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;
use test_case::test_case;

use sur::engine::{default_spec, energy_fraction_below, read_wav, write_wav};
use sur::{AudioBuffer, OutputPolicy, ShaperConfig, ShaperError, StemShaper, StemType};

/// Helper to create a buffer of uniform noise in [-1, 1]
fn create_noise_buffer(channels: usize, sample_rate: u32, duration_secs: f64, seed: u64) -> AudioBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let frames = (sample_rate as f64 * duration_secs) as usize;
    let samples = (0..channels)
        .map(|_| (0..frames).map(|_| rng.gen_range(-1.0f32..=1.0)).collect())
        .collect();
    AudioBuffer::from_channels(samples, sample_rate).unwrap()
}

fn write_stem(path: &Path, buffer: &AudioBuffer) {
    write_wav(buffer, path, default_spec(buffer)).unwrap();
}

// === Full Pipeline Tests ===

#[test]
fn test_drone_noise_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tanpura.wav");
    let noise = create_noise_buffer(2, 44100, 1.0, 7);
    write_stem(&path, &noise);

    let report = StemShaper::default()
        .process(&path, dir.path(), "drone")
        .unwrap();
    assert_eq!(report.output_path, path);

    let shaped = read_wav(&path).unwrap().buffer;
    assert_eq!(shaped.shape(), (2, 44100));
    assert_eq!(shaped.sample_rate(), 44100);
    assert_abs_diff_eq!(shaped.peak(), 1.0, epsilon = 1e-4);

    let low_share = energy_fraction_below(&shaped, 400.0);
    assert!(low_share > 0.9, "only {:.3} of energy below 400 Hz", low_share);
}

#[test_case("plucked-string", 1)]
#[test_case("drone", 1)]
#[test_case("bowed-string", 1)]
#[test_case("sitar", 2)]
#[test_case("tanpura", 2)]
#[test_case("sarangi", 2)]
fn test_process_preserves_shape_and_bounds_peak(tag: &str, channels: usize) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stem.wav");
    let noise = create_noise_buffer(channels, 48000, 0.5, 11);
    write_stem(&path, &noise);

    let report = StemShaper::default().process(&path, dir.path(), tag).unwrap();

    let shaped = read_wav(&path).unwrap().buffer;
    assert_eq!(shaped.shape(), noise.shape());
    assert_eq!(report.frames, noise.num_samples());
    assert!(shaped.peak() <= 1.0);
    assert!(shaped.peak() > 0.99);
}

#[test]
fn test_process_is_deterministic() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");
    let noise = create_noise_buffer(2, 44100, 0.5, 3);
    write_stem(&first, &noise);
    write_stem(&second, &noise);

    let shaper = StemShaper::default();
    for stem in StemType::ALL {
        shaper.process_stem(&first, dir.path(), stem).unwrap();
        shaper.process_stem(&second, dir.path(), stem).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap(), "{}", stem);
    }
}

#[test]
fn test_process_keeps_input_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pcm24.wav");
    let noise = create_noise_buffer(2, 44100, 0.25, 5);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    write_wav(&noise, &path, spec).unwrap();

    StemShaper::default()
        .process(&path, dir.path(), "sarangi")
        .unwrap();

    assert_eq!(read_wav(&path).unwrap().spec, spec);
}

// === Failure Policy Tests ===

#[test]
fn test_unsupported_tag_keeps_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.wav");
    write_stem(&path, &create_noise_buffer(1, 44100, 0.1, 1));
    let before = fs::read(&path).unwrap();

    let err = StemShaper::default()
        .process(&path, dir.path(), "veena")
        .unwrap_err();

    assert_eq!(err.root_cause().error_code(), "UNSUPPORTED_STEM_TYPE");
    assert!(err.to_string().contains("Veena"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_corrupt_input_is_removed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sitar.wav");
    fs::write(&path, b"RIFF....not really a wave file").unwrap();

    let err = StemShaper::default()
        .process(&path, dir.path(), "sitar")
        .unwrap_err();

    assert!(matches!(err.root_cause(), ShaperError::Decode { .. }));
    assert!(err.to_string().starts_with("Sitar stem processing failed"));
    assert!(!path.exists());
}

#[test]
fn test_low_sample_rate_fails_and_removes_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sitar.wav");
    // 5 kHz harmonics stage sits at Nyquist for 10 kHz audio
    write_stem(&path, &create_noise_buffer(1, 10000, 0.1, 9));

    let err = StemShaper::default()
        .process(&path, dir.path(), "plucked-string")
        .unwrap_err();

    assert!(matches!(err.root_cause(), ShaperError::InvalidFilter { .. }));
    assert!(!path.exists());
}

#[test]
fn test_missing_input_reports_decode_error() {
    let dir = tempdir().unwrap();
    let err = StemShaper::default()
        .process(&dir.path().join("absent.wav"), dir.path(), "drone")
        .unwrap_err();
    assert!(matches!(err.root_cause(), ShaperError::Decode { .. }));
}

#[test]
fn test_write_failure_reports_encode_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sarangi.wav");
    let noise = create_noise_buffer(2, 44100, 0.1, 13);
    write_stem(&path, &noise);
    let before = fs::read(&path).unwrap();
    let missing_dir = dir.path().join("missing");

    let shaper = StemShaper::new(ShaperConfig {
        output: OutputPolicy::OutputDir,
        ..Default::default()
    })
    .unwrap();
    let err = shaper.process(&path, &missing_dir, "bowed-string").unwrap_err();

    assert!(matches!(err, ShaperError::StemProcessing { .. }));
    assert!(matches!(err.root_cause(), ShaperError::Encode { .. }));
    assert!(err.to_string().starts_with("Sarangi stem processing failed"));
    assert!(!missing_dir.join("sarangi.wav").exists());
    assert_eq!(fs::read(&path).unwrap(), before);
}
