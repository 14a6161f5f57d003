//! Shaper configuration
//!
//! Loaded from a JSON file; every field has a default matching the tuned
//! pipeline, so an empty object `{}` is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dsp::{PostProcessor, RenderOptions, SoftKneeCompressor, DEFAULT_NORMALIZE_EPSILON};
use crate::error::{Result, ShaperError};

/// Where the driver writes the shaped stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Overwrite the input file
    #[default]
    InPlace,
    /// Write `<output_dir>/<input file name>` and leave the input alone
    OutputDir,
}

/// Runtime settings for the stem shaping pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaperConfig {
    pub compression: SoftKneeCompressor,
    pub normalize_epsilon: f32,
    pub clamp_filter_stages: bool,
    pub output: OutputPolicy,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            compression: SoftKneeCompressor::default(),
            normalize_epsilon: DEFAULT_NORMALIZE_EPSILON,
            clamp_filter_stages: true,
            output: OutputPolicy::default(),
        }
    }
}

impl ShaperConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ShaperConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.compression.validate()?;
        if !self.normalize_epsilon.is_finite() || self.normalize_epsilon <= 0.0 {
            return Err(ShaperError::Config {
                reason: format!(
                    "normalize_epsilon must be > 0, got {}",
                    self.normalize_epsilon
                ),
            });
        }
        Ok(())
    }

    pub fn post_processor(&self) -> PostProcessor {
        PostProcessor {
            compressor: self.compression,
            epsilon: self.normalize_epsilon,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            clamp_filter_stages: self.clamp_filter_stages,
        }
    }

    /// Path the shaped stem for `input_path` is written to
    pub fn output_path(&self, input_path: &Path, output_dir: &Path) -> PathBuf {
        match self.output {
            OutputPolicy::InPlace => input_path.to_path_buf(),
            OutputPolicy::OutputDir => match input_path.file_name() {
                Some(name) => output_dir.join(name),
                None => output_dir.join("stem.wav"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_empty_object_is_default() {
        let config: ShaperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ShaperConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: ShaperConfig =
            serde_json::from_str(r#"{"compression": {"ratio": 8.0}, "output": "output_dir"}"#).unwrap();
        assert_eq!(config.compression.threshold, 0.3);
        assert_eq!(config.compression.ratio, 8.0);
        assert_eq!(config.output, OutputPolicy::OutputDir);
        assert!(config.clamp_filter_stages);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sur.json");
        let config = ShaperConfig {
            clamp_filter_stages: false,
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(ShaperConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"normalize_epsilon": 0.0}"#).unwrap();

        assert!(matches!(
            ShaperConfig::load(&path),
            Err(ShaperError::Config { .. })
        ));
    }

    #[test]
    fn test_output_path_policy() {
        let input = Path::new("/jobs/42/sitar.wav");
        let out_dir = Path::new("/exports");

        let in_place = ShaperConfig::default();
        assert_eq!(in_place.output_path(input, out_dir), input.to_path_buf());

        let separate = ShaperConfig {
            output: OutputPolicy::OutputDir,
            ..Default::default()
        };
        assert_eq!(
            separate.output_path(input, out_dir),
            PathBuf::from("/exports/sitar.wav")
        );
    }
}
