//! Recipe Benchmarks
//!
//! Performance benchmarks for the instrument recipes and post-processing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sur::dsp::PostProcessor;
use sur::{AudioBuffer, StemShaper, StemType};

fn stereo_sine(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let frames = (duration_secs * sample_rate as f32) as usize;
    let channel: Vec<f32> = (0..frames)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect();
    AudioBuffer::from_channels(vec![channel.clone(), channel], sample_rate).unwrap()
}

fn benchmark_recipes(c: &mut Criterion) {
    let buffer = stereo_sine(440.0, 10.0, 44100);
    let shaper = StemShaper::default();

    for stem in StemType::ALL {
        c.bench_function(&format!("{}_10s_stereo", stem.instrument_name()), |b| {
            b.iter(|| shaper.shape(black_box(&buffer), stem).unwrap())
        });
    }
}

fn benchmark_post_processing(c: &mut Criterion) {
    let buffer = stereo_sine(440.0, 10.0, 44100).scaled(2.0);
    let post = PostProcessor::default();

    c.bench_function("post_process_10s_stereo", |b| {
        b.iter(|| post.process(black_box(&buffer)))
    });
}

criterion_group!(benches, benchmark_recipes, benchmark_post_processing);
criterion_main!(benches);
