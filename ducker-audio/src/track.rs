//! In-memory PCM track

use crate::error::DuckingError;
use crate::gain::db_to_linear;

/// Interleaved f32 PCM audio at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    /// Interleaved samples (normalized to -1.0 to 1.0)
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Number of interleaved channels
    channels: u16,
}

impl AudioTrack {
    /// Create a track from interleaved samples
    ///
    /// A trailing partial frame is dropped. A zero channel count is treated as mono.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Create an empty track
    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self::new(Vec::new(), sample_rate, channels)
    }

    /// Create a silent track of `frames` frames
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in whole milliseconds (floored)
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Duration in milliseconds, counting a trailing partial millisecond
    pub fn duration_ms_ceil(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000).div_ceil(self.sample_rate as u64)
    }

    /// Convert a millisecond offset to a frame offset at this track's rate
    pub fn ms_to_frames(&self, ms: u64) -> usize {
        (ms * self.sample_rate as u64 / 1000) as usize
    }

    /// Check if two tracks share sample rate and channel layout
    pub fn same_format(&self, other: &AudioTrack) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Copy out frames `[start, end)`, clamped to the track
    pub fn slice_frames(&self, start: usize, end: usize) -> AudioTrack {
        let ch = self.channels as usize;
        let end = end.min(self.frames());
        let start = start.min(end);
        Self {
            samples: self.samples[start * ch..end * ch].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Copy out the range `[start_ms, end_ms)`, clamped to the track
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioTrack {
        self.slice_frames(self.ms_to_frames(start_ms), self.ms_to_frames(end_ms))
    }

    /// Append another track of the same format
    pub fn append(&mut self, other: &AudioTrack) -> Result<(), DuckingError> {
        if !self.same_format(other) {
            return Err(DuckingError::FormatMismatch {
                voice_rate: self.sample_rate,
                voice_channels: self.channels,
                music_rate: other.sample_rate,
                music_channels: other.channels,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Repeat the track end-to-end as needed, then cut to exactly `frames`
    ///
    /// Never pads with silence, so looping an empty track is an error.
    pub fn looped_to_frames(&self, frames: usize) -> Result<AudioTrack, DuckingError> {
        if frames == 0 {
            return Ok(Self::empty(self.sample_rate, self.channels));
        }
        if self.is_empty() {
            return Err(DuckingError::MissingInput("cannot loop an empty track"));
        }

        let len = self.frames();
        let mut looped = if len < frames {
            let repeats = frames / len + 1;
            let mut samples = Vec::with_capacity(repeats * self.samples.len());
            for _ in 0..repeats {
                samples.extend_from_slice(&self.samples);
            }
            Self {
                samples,
                sample_rate: self.sample_rate,
                channels: self.channels,
            }
        } else {
            self.clone()
        };

        looped.samples.truncate(frames * self.channels as usize);
        Ok(looped)
    }

    /// Scale every sample by a gain in dB
    pub fn apply_gain_db(&mut self, gain_db: f32) {
        if gain_db == 0.0 {
            return;
        }
        let gain = db_to_linear(gain_db);
        for sample in self.samples.iter_mut() {
            *sample *= gain;
        }
    }

    /// Convert to a different channel count
    ///
    /// Mono is duplicated to every output channel; anything else is
    /// averaged down to mono first.
    pub fn with_channels(&self, channels: u16) -> AudioTrack {
        let channels = channels.max(1);
        if channels == self.channels {
            return self.clone();
        }

        let src = self.channels as usize;
        let dst = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst);

        for frame in self.samples.chunks_exact(src) {
            let mono = frame.iter().sum::<f32>() / src as f32;
            if src == 1 || dst == 1 {
                samples.extend(std::iter::repeat(mono).take(dst));
            } else {
                // Keep the channels both layouts share, fill the rest with the downmix
                for ch in 0..dst {
                    samples.push(frame.get(ch).copied().unwrap_or(mono));
                }
            }
        }

        Self {
            samples,
            sample_rate: self.sample_rate,
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: u16) -> AudioTrack {
        let samples = (0..frames * channels as usize)
            .map(|i| i as f32 / 1000.0)
            .collect();
        AudioTrack::new(samples, 1000, channels)
    }

    #[test]
    fn test_partial_frame_dropped() {
        let track = AudioTrack::new(vec![0.1, 0.2, 0.3], 48000, 2);
        assert_eq!(track.frames(), 1);
        assert_eq!(track.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn test_duration_and_ms_conversion() {
        let track = AudioTrack::silence(44100 + 44, 44100, 2);
        assert_eq!(track.duration_ms(), 1000);
        assert_eq!(track.duration_ms_ceil(), 1001);
        assert_eq!(AudioTrack::silence(2000, 2000, 1).duration_ms_ceil(), 1000);
        assert_eq!(AudioTrack::silence(10, 0, 1).duration_ms_ceil(), 0);
        assert_eq!(track.ms_to_frames(100), 4410);
        assert_eq!(track.ms_to_frames(1), 44);
    }

    #[test]
    fn test_slice_clamps() {
        let track = ramp(10, 1);
        assert_eq!(track.slice_frames(8, 20).frames(), 2);
        assert_eq!(track.slice_frames(12, 20).frames(), 0);
        assert_eq!(track.slice_ms(2, 5).samples(), &[0.002, 0.003, 0.004]);
    }

    #[test]
    fn test_loop_short_track_by_one_frame() {
        let track = ramp(99, 2);
        let looped = track.looped_to_frames(100).unwrap();

        assert_eq!(looped.frames(), 100);
        // Frame 99 wraps back to the first frame
        assert_eq!(&looped.samples()[198..200], &track.samples()[0..2]);
        assert_eq!(&looped.samples()[..198], track.samples());
    }

    #[test]
    fn test_loop_truncates_long_track() {
        let track = ramp(500, 1);
        let looped = track.looped_to_frames(120).unwrap();
        assert_eq!(looped.samples(), &track.samples()[..120]);
    }

    #[test]
    fn test_loop_empty_is_error() {
        let track = AudioTrack::empty(1000, 1);
        assert!(matches!(
            track.looped_to_frames(10),
            Err(DuckingError::MissingInput(_))
        ));
        assert!(track.looped_to_frames(0).unwrap().is_empty());
    }

    #[test]
    fn test_gain_db() {
        let mut track = AudioTrack::new(vec![1.0, -0.5], 1000, 1);
        track.apply_gain_db(-20.0);
        assert!((track.samples()[0] - 0.1).abs() < 1e-6);
        assert!((track.samples()[1] + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_append_format_mismatch() {
        let mut a = AudioTrack::silence(10, 1000, 1);
        let b = AudioTrack::silence(10, 2000, 1);
        assert!(a.append(&b).is_err());

        let c = AudioTrack::silence(5, 1000, 1);
        a.append(&c).unwrap();
        assert_eq!(a.frames(), 15);
    }

    #[test]
    fn test_channel_conversion() {
        let mono = AudioTrack::new(vec![0.2, 0.4], 1000, 1);
        let stereo = mono.with_channels(2);
        assert_eq!(stereo.samples(), &[0.2, 0.2, 0.4, 0.4]);

        let down = AudioTrack::new(vec![0.2, 0.4, 1.0, 0.0], 1000, 2).with_channels(1);
        assert!((down.samples()[0] - 0.3).abs() < 1e-6);
        assert!((down.samples()[1] - 0.5).abs() < 1e-6);
    }
}
