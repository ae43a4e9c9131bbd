//! Engine errors and warnings

use std::fmt;
use thiserror::Error;

/// Fatal conditions that abort a ducking run before any output is produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DuckingError {
    #[error("Missing input: {0}")]
    MissingInput(&'static str),
    #[error(
        "Format mismatch: voiceover is {voice_rate} Hz / {voice_channels} ch, music is {music_rate} Hz / {music_channels} ch"
    )]
    FormatMismatch {
        voice_rate: u32,
        voice_channels: u16,
        music_rate: u32,
        music_channels: u16,
    },
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("Length mismatch: expected {expected} frames, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Recoverable conditions the caller should surface to the user
#[derive(Debug, Clone, PartialEq)]
pub enum DuckingWarning {
    /// No silence was found, so the music stays ducked for the whole track
    NoSilenceDetected,
    /// A silence interval fell outside the track or was inverted and got clamped
    IntervalClamped {
        /// Position of the interval in the input list
        index: usize,
        start_secs: f64,
        end_secs: Option<f64>,
    },
}

impl fmt::Display for DuckingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSilenceDetected => write!(
                f,
                "no silence periods detected; the music stays ducked for the whole voiceover"
            ),
            Self::IntervalClamped {
                index,
                start_secs,
                end_secs,
            } => match end_secs {
                Some(end) => write!(
                    f,
                    "silence interval #{index} ({start_secs:.3}s..{end:.3}s) clamped to the track"
                ),
                None => write!(
                    f,
                    "silence interval #{index} ({start_secs:.3}s..end) clamped to the track"
                ),
            },
        }
    }
}
