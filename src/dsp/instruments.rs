//! Instrument recipes
//!
//! Hand-tuned filter cascades that pull a pseudo-instrument out of the
//! separator's "other" stem. The frequencies, Q values and gains below are
//! tuned parameters; changing them changes the output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::recipe::{FilterSpec, Recipe, Step, INPUT};
use crate::error::ShaperError;

// ============================================================================
// Stem types
// ============================================================================

/// Target instrument for a shaped stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StemType {
    /// Sitar-like plucked string
    PluckedString,
    /// Tanpura-like drone
    Drone,
    /// Sarangi-like bowed string with sympathetic resonance
    BowedString,
}

impl StemType {
    pub const ALL: [StemType; 3] = [StemType::PluckedString, StemType::Drone, StemType::BowedString];

    /// Canonical tag
    pub fn tag(&self) -> &'static str {
        match self {
            StemType::PluckedString => "plucked-string",
            StemType::Drone => "drone",
            StemType::BowedString => "bowed-string",
        }
    }

    /// Instrument the recipe imitates; also the output file stem
    pub fn instrument_name(&self) -> &'static str {
        match self {
            StemType::PluckedString => "sitar",
            StemType::Drone => "tanpura",
            StemType::BowedString => "sarangi",
        }
    }

    pub fn recipe(&self) -> &'static Recipe {
        match self {
            StemType::PluckedString => &PLUCKED_STRING,
            StemType::Drone => &DRONE,
            StemType::BowedString => &BOWED_STRING,
        }
    }
}

impl fmt::Display for StemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for StemType {
    type Err = ShaperError;

    /// Accepts canonical tags and instrument names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        StemType::ALL
            .into_iter()
            .find(|stem| normalized == stem.tag() || normalized == stem.instrument_name())
            .ok_or_else(|| ShaperError::UnsupportedStemType { tag: s.to_string() })
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// Sitar: strip sub-bass and pad frequencies, isolate string fundamentals,
/// then add boosted "jangle" and brilliance branches.
pub static PLUCKED_STRING: Recipe = Recipe {
    name: "plucked-string",
    steps: &[
        Step::Filter {
            input: INPUT,
            output: "no_sub_bass",
            filter: FilterSpec::highpass(250.0),
        },
        // Pad reduction: upper cut then lower cut
        Step::Filter {
            input: "no_sub_bass",
            output: "pad_upper_cut",
            filter: FilterSpec::lowpass(500.0),
        },
        Step::Filter {
            input: "pad_upper_cut",
            output: "pad_cut",
            filter: FilterSpec::highpass(300.0),
        },
        Step::Filter {
            input: "pad_cut",
            output: "base",
            filter: FilterSpec::bandpass(750.0, 0.5),
        },
        // Upper harmonics, 2-5 kHz
        Step::Filter {
            input: "base",
            output: "harmonics_hp",
            filter: FilterSpec::highpass(2000.0),
        },
        Step::Filter {
            input: "harmonics_hp",
            output: "harmonics_band",
            filter: FilterSpec::lowpass(5000.0),
        },
        Step::Gain {
            input: "harmonics_band",
            output: "harmonics",
            gain: 3.0,
        },
        // Brilliance
        Step::Filter {
            input: "base",
            output: "brilliance_hp",
            filter: FilterSpec::highpass(4000.0),
        },
        Step::Gain {
            input: "brilliance_hp",
            output: "brilliance",
            gain: 2.0,
        },
        Step::Mix {
            inputs: &["base", "harmonics", "brilliance"],
            output: "out",
        },
    ],
    output: "out",
};

/// Tanpura: keep only the low drone region, boost fundamental and first
/// harmonic, smooth transients.
pub static DRONE: Recipe = Recipe {
    name: "drone",
    steps: &[
        Step::Filter {
            input: INPUT,
            output: "low",
            filter: FilterSpec::lowpass(400.0),
        },
        Step::Filter {
            input: "low",
            output: "base",
            filter: FilterSpec::lowpass(300.0),
        },
        Step::Filter {
            input: "base",
            output: "fundamental_band",
            filter: FilterSpec::bandpass(100.0, 1.0),
        },
        Step::Gain {
            input: "fundamental_band",
            output: "fundamental",
            gain: 2.0,
        },
        Step::Filter {
            input: "base",
            output: "harmonic_band",
            filter: FilterSpec::bandpass(200.0, 1.0),
        },
        Step::Gain {
            input: "harmonic_band",
            output: "harmonic",
            gain: 1.5,
        },
        Step::Mix {
            inputs: &["fundamental", "harmonic"],
            output: "drone",
        },
        Step::Filter {
            input: "drone",
            output: "out",
            filter: FilterSpec::lowpass(250.0),
        },
    ],
    output: "out",
};

/// Sarangi: body resonance base plus boosted mids, subtle bow noise and
/// sympathetic-string ring, rolled off above 3 kHz.
pub static BOWED_STRING: Recipe = Recipe {
    name: "bowed-string",
    steps: &[
        Step::Filter {
            input: INPUT,
            output: "base",
            filter: FilterSpec::bandpass(400.0, 0.7),
        },
        Step::Filter {
            input: "base",
            output: "mids_band",
            filter: FilterSpec::bandpass(800.0, 1.0),
        },
        Step::Gain {
            input: "mids_band",
            output: "mids",
            gain: 2.0,
        },
        Step::Filter {
            input: "base",
            output: "bow_hp",
            filter: FilterSpec::highpass(1200.0),
        },
        Step::Filter {
            input: "bow_hp",
            output: "bow_band",
            filter: FilterSpec::lowpass(2000.0),
        },
        Step::Gain {
            input: "bow_band",
            output: "bow_noise",
            gain: 0.7,
        },
        Step::Filter {
            input: "base",
            output: "sympathetic_band",
            filter: FilterSpec::bandpass(1000.0, 2.0),
        },
        Step::Gain {
            input: "sympathetic_band",
            output: "sympathetic",
            gain: 1.2,
        },
        Step::Mix {
            inputs: &["base", "mids", "bow_noise", "sympathetic"],
            output: "body",
        },
        Step::Filter {
            input: "body",
            output: "out",
            filter: FilterSpec::lowpass(3000.0),
        },
    ],
    output: "out",
};
