//! Amplitude-threshold silence detection
//!
//! Finds ranges of a voiceover where every channel stays below a noise
//! floor for at least a minimum duration. The behaviour matches ffmpeg's
//! `silencedetect` filter closely enough that either source can feed the
//! ducking envelope.

use crate::interval::SilenceInterval;
use thiserror::Error;

/// Errors from silence analysis
#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("Invalid channel count: {0}")]
    InvalidChannels(u16),
}

/// Silence detector settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceDetectorConfig {
    /// Noise floor in dBFS; frames quieter than this count as silent
    pub threshold_db: f32,
    /// Shortest run of silence that is reported, in seconds
    pub min_silence_secs: f64,
}

impl Default for SilenceDetectorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -30.0,
            min_silence_secs: 0.1,
        }
    }
}

/// Detects silent ranges in interleaved PCM audio
pub struct SilenceDetector {
    config: SilenceDetectorConfig,
    /// Linear amplitude equivalent of the threshold
    threshold: f32,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self::new(SilenceDetectorConfig::default())
    }
}

impl SilenceDetector {
    /// Create a detector with the given settings
    pub fn new(config: SilenceDetectorConfig) -> Self {
        Self {
            config,
            threshold: 10.0f32.powf(config.threshold_db / 20.0),
        }
    }

    /// Current settings
    pub fn config(&self) -> &SilenceDetectorConfig {
        &self.config
    }

    /// Scan interleaved samples and return the silent ranges in order
    ///
    /// A run still silent at the end of the input is reported open-ended.
    pub fn detect(
        &self,
        samples: &[f32],
        sample_rate: u32,
        channels: u16,
    ) -> Result<Vec<SilenceInterval>, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 {
            return Err(AnalysisError::InvalidChannels(channels));
        }

        let rate = sample_rate as f64;
        let min_frames = ((self.config.min_silence_secs.max(0.0) * rate).round() as usize).max(1);

        let mut intervals = Vec::new();
        let mut run_start: Option<usize> = None;
        let mut total_frames = 0;

        for (frame_idx, frame) in samples.chunks_exact(channels as usize).enumerate() {
            total_frames = frame_idx + 1;
            let silent = frame.iter().all(|s| s.abs() < self.threshold);

            match (silent, run_start) {
                (true, None) => run_start = Some(frame_idx),
                (false, Some(start)) => {
                    if frame_idx - start >= min_frames {
                        intervals.push(SilenceInterval::new(
                            start as f64 / rate,
                            frame_idx as f64 / rate,
                        ));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        if let Some(start) = run_start {
            if total_frames - start >= min_frames {
                intervals.push(SilenceInterval::open(start as f64 / rate));
            }
        }

        tracing::debug!(
            "Detected {} silence intervals (threshold {} dB, min {} s)",
            intervals.len(),
            self.config.threshold_db,
            self.config.min_silence_secs
        );

        Ok(intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mono signal built from (loud, milliseconds) segments
    fn mono_pattern(sample_rate: u32, pattern: &[(bool, u32)]) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(loud, ms) in pattern {
            let frames = (sample_rate as u64 * ms as u64 / 1000) as usize;
            let value = if loud { 0.5 } else { 0.0 };
            samples.extend(std::iter::repeat(value).take(frames));
        }
        samples
    }

    #[test]
    fn test_detects_terminated_silence() {
        let detector = SilenceDetector::default();
        let samples = mono_pattern(1000, &[(true, 500), (false, 1000), (true, 500)]);

        let intervals = detector.detect(&samples, 1000, 1).unwrap();
        assert_eq!(intervals, vec![SilenceInterval::new(0.5, 1.5)]);
    }

    #[test]
    fn test_trailing_silence_is_open() {
        let detector = SilenceDetector::default();
        let samples = mono_pattern(1000, &[(true, 200), (false, 300)]);

        let intervals = detector.detect(&samples, 1000, 1).unwrap();
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].is_open());
        assert!((intervals[0].start_secs - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_short_gaps_are_ignored() {
        let detector = SilenceDetector::default();
        // 50ms gap is below the 100ms minimum
        let samples = mono_pattern(1000, &[(true, 200), (false, 50), (true, 200)]);

        let intervals = detector.detect(&samples, 1000, 1).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_any_loud_channel_breaks_silence() {
        let detector = SilenceDetector::default();
        // Stereo: left silent throughout, right loud throughout
        let samples: Vec<f32> = (0..2000).map(|i| if i % 2 == 0 { 0.0 } else { 0.5 }).collect();

        let intervals = detector.detect(&samples, 1000, 2).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_threshold_respected() {
        let detector = SilenceDetector::new(SilenceDetectorConfig {
            threshold_db: -20.0,
            min_silence_secs: 0.1,
        });
        // 0.05 is about -26 dBFS, below a -20 dB floor
        let samples = vec![0.05f32; 500];

        let intervals = detector.detect(&samples, 1000, 1).unwrap();
        assert_eq!(intervals, vec![SilenceInterval::open(0.0)]);
    }

    #[test]
    fn test_invalid_format() {
        let detector = SilenceDetector::default();
        assert_eq!(
            detector.detect(&[0.0], 0, 1),
            Err(AnalysisError::InvalidSampleRate(0))
        );
        assert_eq!(
            detector.detect(&[0.0], 1000, 0),
            Err(AnalysisError::InvalidChannels(0))
        );
    }
}
