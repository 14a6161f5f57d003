//! Instrument recipe model
//!
//! A recipe is a constant table of steps over named signals. Every step
//! reads existing signals and defines exactly one new signal; a name can
//! only be defined once, so branches that share a base signal never alias.
//! The raw stem is available as [`INPUT`].

use std::collections::HashMap;

use log::debug;

use super::biquad::{Biquad, FilterKind, DEFAULT_Q};
use crate::engine::AudioBuffer;
use crate::error::{Result, ShaperError};

/// Name of the signal holding the unprocessed input
pub const INPUT: &str = "input";

/// Filter stage without a sample rate; bound to the input's rate at render time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub frequency_hz: f64,
    pub q: f64,
}

impl FilterSpec {
    pub const fn lowpass(cutoff_hz: f64) -> Self {
        Self {
            kind: FilterKind::LowPass,
            frequency_hz: cutoff_hz,
            q: DEFAULT_Q,
        }
    }

    pub const fn highpass(cutoff_hz: f64) -> Self {
        Self {
            kind: FilterKind::HighPass,
            frequency_hz: cutoff_hz,
            q: DEFAULT_Q,
        }
    }

    pub const fn bandpass(center_hz: f64, q: f64) -> Self {
        Self {
            kind: FilterKind::BandPass,
            frequency_hz: center_hz,
            q,
        }
    }

    pub fn bind(&self, sample_rate: u32) -> Result<Biquad> {
        Biquad::new(self.kind, sample_rate, self.frequency_hz, self.q)
    }
}

/// One recipe step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// `output = filter(input)`
    Filter {
        input: &'static str,
        output: &'static str,
        filter: FilterSpec,
    },
    /// `output = input * gain`
    Gain {
        input: &'static str,
        output: &'static str,
        gain: f32,
    },
    /// `output = sum(inputs)`
    Mix {
        inputs: &'static [&'static str],
        output: &'static str,
    },
}

impl Step {
    fn output(&self) -> &'static str {
        match self {
            Step::Filter { output, .. } | Step::Gain { output, .. } | Step::Mix { output, .. } => {
                *output
            }
        }
    }

    fn bind(&self, sample_rate: u32) -> Result<BoundStep> {
        Ok(match *self {
            Step::Filter { input, filter, .. } => BoundStep::Filter {
                input,
                biquad: filter.bind(sample_rate)?,
            },
            Step::Gain { input, gain, .. } => BoundStep::Gain { input, gain },
            Step::Mix { inputs, .. } => BoundStep::Mix { inputs },
        })
    }
}

/// A step whose filter has been resolved against the input's sample rate
enum BoundStep {
    Filter { input: &'static str, biquad: Biquad },
    Gain { input: &'static str, gain: f32 },
    Mix { inputs: &'static [&'static str] },
}

/// Options that apply to every recipe render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Clamp each filter stage's output to [-1, 1]
    pub clamp_filter_stages: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            clamp_filter_stages: true,
        }
    }
}

/// A named, fixed sequence of steps producing the signal `output`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub name: &'static str,
    pub steps: &'static [Step],
    pub output: &'static str,
}

impl Recipe {
    /// Run the recipe on `input`, returning a new buffer of the same shape
    ///
    /// `input` is never modified. Filter frequencies are validated against
    /// the input's sample rate before any audio is processed.
    pub fn render(&self, input: &AudioBuffer, options: RenderOptions) -> Result<AudioBuffer> {
        let sample_rate = input.sample_rate();
        let bound = self.bind_steps(sample_rate)?;

        let mut signals: HashMap<&'static str, AudioBuffer> = HashMap::new();
        signals.insert(INPUT, input.clone());

        for (step, output) in bound {
            let rendered = match step {
                BoundStep::Filter { input, biquad } => {
                    let filtered = biquad.apply(self.signal(&signals, input)?);
                    if options.clamp_filter_stages {
                        filtered.map(|s| s.clamp(-1.0, 1.0))
                    } else {
                        filtered
                    }
                }
                BoundStep::Gain { input, gain } => self.signal(&signals, input)?.scaled(gain),
                BoundStep::Mix { inputs } => {
                    let sources = inputs
                        .iter()
                        .map(|name| self.signal(&signals, name))
                        .collect::<Result<Vec<_>>>()?;
                    AudioBuffer::sum(&sources)?
                }
            };

            if signals.insert(output, rendered).is_some() {
                return Err(ShaperError::Recipe {
                    recipe: self.name,
                    reason: format!("signal '{}' is defined more than once", output),
                });
            }
        }

        debug!("recipe '{}' rendered {} steps", self.name, self.steps.len());

        signals.remove(self.output).ok_or_else(|| ShaperError::Recipe {
            recipe: self.name,
            reason: format!("output signal '{}' is never defined", self.output),
        })
    }

    /// Resolve every step against `sample_rate`, paired with the signal it defines
    fn bind_steps(&self, sample_rate: u32) -> Result<Vec<(BoundStep, &'static str)>> {
        self.steps
            .iter()
            .map(|step| Ok((step.bind(sample_rate)?, step.output())))
            .collect()
    }

    fn signal<'a>(
        &self,
        signals: &'a HashMap<&'static str, AudioBuffer>,
        name: &str,
    ) -> Result<&'a AudioBuffer> {
        signals.get(name).ok_or_else(|| ShaperError::Recipe {
            recipe: self.name,
            reason: format!("signal '{}' is used before it is defined", name),
        })
    }
}
