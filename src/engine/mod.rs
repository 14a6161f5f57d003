//! Audio Engine Module
//!
//! Buffer type, WAV file I/O and spectral measurement shared by the
//! shaping pipeline and the CLI.

pub mod buffer;
pub mod io;
pub mod spectrum;

pub use buffer::{calculate_peak, calculate_rms, linear_to_db, AudioBuffer};
pub use io::{default_spec, read_wav, write_wav, DecodedAudio};
pub use spectrum::energy_fraction_below;
