//! Error handling for Sur
//!
//! Every failure inside the pipeline driver is wrapped in
//! [`ShaperError::StemProcessing`] so callers always learn which stem failed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Sur operations
pub type Result<T> = std::result::Result<T, ShaperError>;

/// Main error type for stem shaping operations
#[derive(Error, Debug)]
pub enum ShaperError {
    // Codec Errors
    #[error("Failed to decode audio '{}': {reason}", .path.display())]
    Decode {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Failed to encode audio '{}': {reason}", .path.display())]
    Encode {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Dispatch Errors
    #[error("Unsupported stem type: {tag}")]
    UnsupportedStemType { tag: String },

    // DSP Errors
    #[error("Invalid {kind} filter: {reason} (frequency {frequency_hz} Hz, sample rate {sample_rate} Hz)")]
    InvalidFilter {
        kind: &'static str,
        frequency_hz: f64,
        sample_rate: u32,
        reason: String,
    },

    #[error("Buffer shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Recipe '{recipe}' is malformed: {reason}")]
    Recipe { recipe: &'static str, reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // Wrapper
    #[error("{} stem processing failed: {source}", capitalize(.stem))]
    StemProcessing {
        stem: String,
        #[source]
        source: Box<ShaperError>,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShaperError {
    /// Wrap an error with the stem tag it occurred under
    pub fn for_stem(stem: impl Into<String>, source: ShaperError) -> Self {
        ShaperError::StemProcessing {
            stem: stem.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through any `StemProcessing` wrappers
    pub fn root_cause(&self) -> &ShaperError {
        match self {
            ShaperError::StemProcessing { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ShaperError::Decode { .. } => "DECODE_ERROR",
            ShaperError::Encode { .. } => "ENCODE_ERROR",
            ShaperError::EmptyAudio => "EMPTY_AUDIO",
            ShaperError::UnsupportedStemType { .. } => "UNSUPPORTED_STEM_TYPE",
            ShaperError::InvalidFilter { .. } => "INVALID_FILTER",
            ShaperError::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            ShaperError::Recipe { .. } => "RECIPE_ERROR",
            ShaperError::Config { .. } => "CONFIG_ERROR",
            ShaperError::StemProcessing { .. } => "STEM_PROCESSING_ERROR",
            ShaperError::Io(_) => "IO_ERROR",
            ShaperError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the caller can fix this error by changing its input
    pub fn is_recoverable(&self) -> bool {
        match self {
            ShaperError::StemProcessing { source, .. } => source.is_recoverable(),
            ShaperError::Decode { .. }
            | ShaperError::EmptyAudio
            | ShaperError::UnsupportedStemType { .. }
            | ShaperError::InvalidFilter { .. }
            | ShaperError::Config { .. } => true,
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self.root_cause() {
            ShaperError::Decode { .. } => vec![
                "Check the file is an uncompressed WAV (8/16/24/32-bit PCM or 32-bit float)",
                "Re-run the source separation step to regenerate the stem",
            ],
            ShaperError::EmptyAudio => vec!["The stem contains no frames; check the separator output"],
            ShaperError::UnsupportedStemType { .. } => vec![
                "Supported stems: plucked-string (sitar), drone (tanpura), bowed-string (sarangi)",
                "Run 'sur-cli stems' to list all accepted tags",
            ],
            ShaperError::InvalidFilter { .. } => vec![
                "The sample rate is too low for this recipe's filter frequencies",
                "Resample the stem to 44.1 kHz or 48 kHz before shaping",
            ],
            ShaperError::Encode { .. } => vec![
                "Check write permissions for the output location",
                "Free up disk space",
            ],
            _ => vec![],
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
