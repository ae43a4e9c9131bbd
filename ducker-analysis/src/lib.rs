//! Voiceover analysis for ducker
//!
//! Provides silence detection on decoded PCM and parsing of ffmpeg
//! `silencedetect` logs. Both produce the silence intervals that drive
//! the ducking envelope.

mod interval;
mod silence;
mod silencedetect;

pub use interval::{SilenceInterval, TimeInterval};
pub use silence::{AnalysisError, SilenceDetector, SilenceDetectorConfig};
pub use silencedetect::parse_silencedetect_log;
