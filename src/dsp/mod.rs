//! DSP Library
//!
//! Filter primitives, the recipe step model, the three instrument recipes
//! and the shared post-processing stage.

mod biquad;
mod dynamics;
mod instruments;
mod recipe;

pub use biquad::{apply_bandpass, apply_highpass, apply_lowpass, Biquad, FilterKind, DEFAULT_Q};
pub use dynamics::{
    peak_normalize, PostProcessor, SoftKneeCompressor, DEFAULT_NORMALIZE_EPSILON, DEFAULT_RATIO,
    DEFAULT_THRESHOLD,
};
pub use instruments::{StemType, BOWED_STRING, DRONE, PLUCKED_STRING};
pub use recipe::{FilterSpec, Recipe, RenderOptions, Step, INPUT};
