//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::ShaperConfig;
use crate::dsp::StemType;
use crate::engine::{calculate_peak, calculate_rms, energy_fraction_below, read_wav};
use crate::error::Result;
use crate::pipeline::StemShaper;

/// Order in which `derive` produces instrument stems
pub const DERIVE_ORDER: [StemType; 3] = [StemType::PluckedString, StemType::BowedString, StemType::Drone];

/// Build a shaper from an optional config file
pub fn load_shaper(config: Option<&Path>) -> Result<StemShaper> {
    let config = match config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            ShaperConfig::load(path)?
        }
        None => ShaperConfig::default(),
    };
    StemShaper::new(config)
}

/// Shape a single stem file.
pub fn shape(shaper: &StemShaper, path: &Path, stem: &str, output_dir: Option<&Path>, json: bool) -> Result<()> {
    let fallback_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let report = shaper.process(path, output_dir.unwrap_or(fallback_dir), stem)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Shaped {} stem: {} ({} ch, {} frames @ {} Hz, {} ms)",
            report.stem,
            report.output_path.display(),
            report.channels,
            report.frames,
            report.sample_rate,
            report.elapsed_ms
        );
    }

    Ok(())
}

/// Copy the "other" stem once per instrument and shape each copy in place.
///
/// Returns instrument name -> written path.
pub fn derive(
    shaper: &StemShaper,
    other: &Path,
    output_dir: &Path,
    stems: &[String],
) -> Result<BTreeMap<String, PathBuf>> {
    let targets = if stems.is_empty() {
        DERIVE_ORDER.to_vec()
    } else {
        stems
            .iter()
            .map(|tag| tag.parse::<StemType>())
            .collect::<Result<Vec<_>>>()?
    };

    fs::create_dir_all(output_dir)?;

    let mut written = BTreeMap::new();
    for stem in targets {
        let stem_path = output_dir.join(format!("{}.wav", stem.instrument_name()));
        fs::copy(other, &stem_path)?;
        let report = shaper.process_stem(&stem_path, output_dir, stem)?;
        written.insert(stem.instrument_name().to_string(), report.output_path);
    }

    println!("{}", serde_json::to_string_pretty(&written)?);

    Ok(written)
}

/// Print level and spectral information.
pub fn analyze(path: &Path, cutoff_hz: f64) -> Result<()> {
    let decoded = read_wav(path)?;
    let buffer = &decoded.buffer;

    println!("File:        {}", path.display());
    println!(
        "Format:      {} ch, {} Hz, {}-bit {:?}",
        buffer.num_channels(),
        buffer.sample_rate(),
        decoded.spec.bits_per_sample,
        decoded.spec.sample_format
    );
    println!("Frames:      {} ({:.2}s)", buffer.num_samples(), buffer.duration());
    println!("Peak:        {:.2} dBFS", calculate_peak(buffer));
    println!("RMS:         {:.2} dBFS", calculate_rms(buffer));
    println!(
        "Below {:.0} Hz: {:.1}% of energy",
        cutoff_hz,
        100.0 * energy_fraction_below(buffer, cutoff_hz)
    );

    Ok(())
}

/// List supported stem tags.
pub fn list_stems() {
    println!("Supported stems:");
    println!("{:-<40}", "");
    for stem in StemType::ALL {
        println!("  {:<16} alias: {}", stem.tag(), stem.instrument_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{default_spec, write_wav, AudioBuffer};
    use tempfile::tempdir;

    #[test]
    fn test_derive_writes_every_instrument() {
        let dir = tempdir().unwrap();
        let other = dir.path().join("other.wav");
        let noise: Vec<f32> = (0..8820).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();
        let buffer = AudioBuffer::from_channels(vec![noise.clone(), noise], 44100).unwrap();
        write_wav(&buffer, &other, default_spec(&buffer)).unwrap();

        let out_dir = dir.path().join("job");
        let written = derive(&StemShaper::default(), &other, &out_dir, &[]).unwrap();

        assert_eq!(written.len(), 3);
        for name in ["sitar", "sarangi", "tanpura"] {
            assert!(written[name].exists(), "{} missing", name);
        }
        assert!(other.exists());
    }

    #[test]
    fn test_derive_rejects_unknown_stem_before_copying() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("job");
        let result = derive(
            &StemShaper::default(),
            &dir.path().join("other.wav"),
            &out_dir,
            &["veena".to_string()],
        );
        assert!(result.is_err());
        assert!(!out_dir.exists());
    }
}
