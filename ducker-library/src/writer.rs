//! WAV export using hound

use ducker_audio::AudioTrack;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing a track
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Refusing to write an empty track")]
    Empty,
}

/// Sample encoding for exported WAV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavEncoding {
    /// 16-bit signed integer PCM
    #[default]
    Int16,
    /// 32-bit IEEE float
    Float32,
}

/// Writes tracks to WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavExporter {
    encoding: WavEncoding,
}

impl WavExporter {
    pub fn new(encoding: WavEncoding) -> Self {
        Self { encoding }
    }

    /// Write `track` to `path`, replacing any existing file
    pub fn write(&self, track: &AudioTrack, path: &Path) -> Result<(), WriteError> {
        if track.is_empty() {
            return Err(WriteError::Empty);
        }

        let spec = match self.encoding {
            WavEncoding::Int16 => WavSpec {
                channels: track.channels(),
                sample_rate: track.sample_rate(),
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            WavEncoding::Float32 => WavSpec {
                channels: track.channels(),
                sample_rate: track.sample_rate(),
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
        };

        let mut writer = WavWriter::create(path, spec)?;
        match self.encoding {
            WavEncoding::Int16 => {
                for &s in track.samples() {
                    let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    writer.write_sample(v)?;
                }
            }
            WavEncoding::Float32 => {
                for &s in track.samples() {
                    writer.write_sample(s)?;
                }
            }
        }
        writer.finalize()?;

        tracing::info!(
            "Wrote {} ({} frames, {} Hz, {} ch)",
            path.display(),
            track.frames(),
            track.sample_rate(),
            track.channels()
        );
        Ok(())
    }
}
