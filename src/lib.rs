//! Sur - Stem Shaping Pipeline
//!
//! Takes the "other" stem produced by an external source separator and
//! reshapes it into pseudo-instrument tracks with fixed biquad cascades.
//!
//! # Architecture
//!
//! - `dsp`: filter primitives, instrument recipes, compression + normalization
//! - `engine`: audio buffer, WAV I/O, spectral measurement
//! - `pipeline`: the driver that decodes, shapes and writes a stem file
//! - `config`: tunable settings for the driver

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pipeline;

pub use config::{OutputPolicy, ShaperConfig};
pub use dsp::StemType;
pub use engine::AudioBuffer;
pub use error::{Result, ShaperError};
pub use pipeline::{ShapeReport, StemShaper};
