//! Pipeline driver
//!
//! Decodes a separated stem, runs the requested instrument recipe and the
//! post-processing stage, and writes the result back. A failure after the
//! tag has been accepted deletes the files the driver owns before the error
//! is returned, so no half-written output is left behind. With the default
//! in-place policy that is the input itself; callers keep the original by
//! shaping a copy. With an output directory only a target the driver has
//! started writing is removed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{OutputPolicy, ShaperConfig};
use crate::dsp::StemType;
use crate::engine::{read_wav, write_wav, AudioBuffer};
use crate::error::{Result, ShaperError};

/// Summary of one successful `process` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeReport {
    pub stem: StemType,
    pub output_path: PathBuf,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub input_peak: f32,
    pub output_peak: f32,
    pub elapsed_ms: u64,
    pub processed_at: DateTime<Utc>,
}

/// Stem shaping pipeline driver
///
/// Holds no per-call state; one instance can shape any number of stems,
/// including from several threads at once on distinct paths.
#[derive(Debug, Clone, Default)]
pub struct StemShaper {
    config: ShaperConfig,
}

impl StemShaper {
    pub fn new(config: ShaperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    /// Run recipe and post-processing on an in-memory buffer
    ///
    /// The result has the same shape and sample rate as `buffer`.
    pub fn shape(&self, buffer: &AudioBuffer, stem: StemType) -> Result<AudioBuffer> {
        let shaped = stem.recipe().render(buffer, self.config.render_options())?;
        Ok(self.config.post_processor().process(&shaped))
    }

    /// Shape the file at `input_path` for the stem named by `stem_tag`
    ///
    /// The tag is validated before the file is touched: an unknown tag
    /// leaves the input in place. Every error comes back wrapped in
    /// [`ShaperError::StemProcessing`].
    pub fn process(&self, input_path: &Path, output_dir: &Path, stem_tag: &str) -> Result<ShapeReport> {
        let stem = stem_tag
            .parse::<StemType>()
            .map_err(|e| ShaperError::for_stem(stem_tag, e))?;
        self.process_stem(input_path, output_dir, stem)
    }

    /// Shape the file at `input_path` as `stem`
    pub fn process_stem(&self, input_path: &Path, output_dir: &Path, stem: StemType) -> Result<ShapeReport> {
        let target = self.config.output_path(input_path, output_dir);
        info!(
            "Shaping {} stem: {} -> {}",
            stem,
            input_path.display(),
            target.display()
        );

        match self.run(input_path, &target, stem) {
            Ok(report) => {
                info!(
                    "Finished {} stem in {} ms (peak {:.3} -> {:.3})",
                    stem, report.elapsed_ms, report.input_peak, report.output_peak
                );
                Ok(report)
            }
            Err(failure) => {
                let (e, owns_target) = match failure {
                    RunError::BeforeWrite(e) => (e, self.config.output == OutputPolicy::InPlace),
                    RunError::Write(e) => (e, true),
                };
                warn!("Error processing {} stem: {}", stem, e);
                if owns_target {
                    remove_if_present(&target);
                }
                Err(ShaperError::for_stem(stem.instrument_name(), e))
            }
        }
    }

    fn run(
        &self,
        input_path: &Path,
        target: &Path,
        stem: StemType,
    ) -> std::result::Result<ShapeReport, RunError> {
        let started = Instant::now();

        let decoded = read_wav(input_path).map_err(RunError::BeforeWrite)?;
        let buffer = &decoded.buffer;
        debug!(
            "Decoded {}: {} channels, {} frames @ {} Hz",
            input_path.display(),
            buffer.num_channels(),
            buffer.num_samples(),
            buffer.sample_rate()
        );

        let shaped = self.shape(buffer, stem).map_err(RunError::BeforeWrite)?;
        write_wav(&shaped, target, decoded.spec).map_err(RunError::Write)?;

        Ok(ShapeReport {
            stem,
            output_path: target.to_path_buf(),
            sample_rate: shaped.sample_rate(),
            channels: shaped.num_channels(),
            frames: shaped.num_samples(),
            input_peak: buffer.peak(),
            output_peak: shaped.peak(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            processed_at: Utc::now(),
        })
    }
}

/// How far a failed run got
///
/// Under [`OutputPolicy::OutputDir`] the target belongs to the driver only
/// once `write_wav` has been called; an existing file of the same name is
/// left alone when decoding or shaping fails.
enum RunError {
    BeforeWrite(ShaperError),
    Write(ShaperError),
}

/// Best-effort cleanup after a failed run
fn remove_if_present(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
