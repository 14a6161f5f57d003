//! Audio file I/O for Sur
//!
//! Stems arrive as WAV files written by the external source separator.
//! The decoded [`WavSpec`] travels with the buffer so the processed result
//! can be written back in the same format it was read from.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::AudioBuffer;
use crate::error::{Result, ShaperError};

/// A decoded WAV file: the samples plus the format they were stored in
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub buffer: AudioBuffer,
    pub spec: WavSpec,
}

/// Read a WAV file into an [`AudioBuffer`]
///
/// Integer PCM (8/16/24/32-bit) is scaled into [-1, 1); float samples are
/// taken as-is.
///
/// # Errors
/// * `Decode` - If the file cannot be opened or its samples cannot be read
/// * `EmptyAudio` - If the file holds no frames
pub fn read_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = WavReader::open(path).map_err(|e| decode_error(path, "failed to open WAV file", e))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(ShaperError::Decode {
            path: path.to_path_buf(),
            reason: "WAV header declares zero channels".to_string(),
            source: None,
        });
    }

    let interleaved = read_samples_as_f32(reader, spec, path)?;
    let buffer = AudioBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)?;
    if buffer.is_empty() {
        return Err(ShaperError::EmptyAudio);
    }

    Ok(DecodedAudio { buffer, spec })
}

/// Write an [`AudioBuffer`] to a WAV file using `spec` for the sample format
///
/// The channel count and sample rate always come from the buffer. Integer
/// formats clamp to the representable range.
///
/// # Errors
/// * `Encode` - If the file cannot be created or written, or the bit depth
///   is not supported for the sample format
pub fn write_wav(buffer: &AudioBuffer, path: &Path, spec: WavSpec) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        ..spec
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| encode_error(path, "failed to create WAV file", e))?;

    let interleaved = buffer.to_interleaved();

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            for sample in interleaved {
                writer
                    .write_sample(sample)
                    .map_err(|e| encode_error(path, "failed to write sample", e))?;
            }
        }
        (SampleFormat::Int, 8) => {
            for sample in interleaved {
                let scaled = (sample * 127.0).round().clamp(-128.0, 127.0) as i8;
                writer
                    .write_sample(scaled)
                    .map_err(|e| encode_error(path, "failed to write sample", e))?;
            }
        }
        (SampleFormat::Int, 16) => {
            for sample in interleaved {
                let scaled = (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16;
                writer
                    .write_sample(scaled)
                    .map_err(|e| encode_error(path, "failed to write sample", e))?;
            }
        }
        (SampleFormat::Int, 24) => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).round().clamp(-8388608.0, 8388607.0) as i32;
                writer
                    .write_sample(scaled)
                    .map_err(|e| encode_error(path, "failed to write sample", e))?;
            }
        }
        (SampleFormat::Int, 32) => {
            for sample in interleaved {
                let scaled = (sample as f64 * 2147483647.0)
                    .round()
                    .clamp(-2147483648.0, 2147483647.0) as i32;
                writer
                    .write_sample(scaled)
                    .map_err(|e| encode_error(path, "failed to write sample", e))?;
            }
        }
        (format, bits) => {
            return Err(ShaperError::Encode {
                path: path.to_path_buf(),
                reason: format!("unsupported sample format: {:?} {}-bit", format, bits),
                source: None,
            });
        }
    }

    writer
        .finalize()
        .map_err(|e| encode_error(path, "failed to finalize WAV file", e))?;

    Ok(())
}

/// Format used when writing a buffer that did not come from a file
pub fn default_spec(buffer: &AudioBuffer) -> WavSpec {
    WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn decode_error(path: &Path, what: &str, e: hound::Error) -> ShaperError {
    ShaperError::Decode {
        path: path.to_path_buf(),
        reason: format!("{}: {}", what, e),
        source: Some(e),
    }
}

fn encode_error(path: &Path, what: &str, e: hound::Error) -> ShaperError {
    ShaperError::Encode {
        path: path.to_path_buf(),
        reason: format!("{}: {}", what, e),
        source: Some(e),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    spec: WavSpec,
    path: &Path,
) -> Result<Vec<f32>> {
    let read_error = |e| decode_error(path, "failed to read samples", e);

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error),
        (format, bits) => Err(ShaperError::Decode {
            path: path.to_path_buf(),
            reason: format!("unsupported sample format: {:?} {}-bit", format, bits),
            source: None,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
