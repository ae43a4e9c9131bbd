//! Mixer implementation - music fitting, voiceover overlay and tail

use crate::error::DuckingError;
use crate::track::AudioTrack;

/// Clipping applied to the overlaid region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMode {
    /// Saturate at full scale (like summing integer PCM)
    #[default]
    Hard,
    /// Gentle soft knee below full scale
    Soft,
}

impl ClipMode {
    /// Parse a clip mode name (`hard` or `soft`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hard" => Some(Self::Hard),
            "soft" => Some(Self::Soft),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }

    #[inline]
    fn clip(&self, x: f32) -> f32 {
        match self {
            Self::Hard => x.clamp(-1.0, 1.0),
            Self::Soft => soft_clip(x),
        }
    }
}

/// Mixer combining the voiceover with the ducked music bed
///
/// With a zero tail the music is cut to the voiceover's length and
/// overlaid. With a tail, the music runs `tail_ms` past the voiceover and
/// that remainder is appended after the overlay untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mixer {
    /// Music tail after the voiceover ends, in milliseconds
    tail_ms: u64,
    /// Clipping for the overlay region
    clip: ClipMode,
}

impl Mixer {
    /// Create a mixer
    pub fn new(tail_ms: u64, clip: ClipMode) -> Self {
        Self { tail_ms, clip }
    }

    pub fn tail_ms(&self) -> u64 {
        self.tail_ms
    }

    pub fn clip(&self) -> ClipMode {
        self.clip
    }

    /// Frames the music bed must have to cover `voiceover` plus the tail
    pub fn required_frames(&self, voiceover: &AudioTrack) -> usize {
        voiceover.frames() + voiceover.ms_to_frames(self.tail_ms)
    }

    /// Loop or truncate `music` to exactly the required length
    pub fn fit_music(
        &self,
        voiceover: &AudioTrack,
        music: &AudioTrack,
    ) -> Result<AudioTrack, DuckingError> {
        check_format(voiceover, music)?;
        let required = self.required_frames(voiceover);
        if music.frames() < required {
            tracing::debug!(
                "Looping music ({} frames) to cover {} frames",
                music.frames(),
                required
            );
        }
        music.looped_to_frames(required)
    }

    /// Additive overlay of two equal-length tracks
    pub fn overlay(&self, base: &AudioTrack, top: &AudioTrack) -> Result<AudioTrack, DuckingError> {
        check_format(base, top)?;
        if base.frames() != top.frames() {
            return Err(DuckingError::LengthMismatch {
                expected: base.frames(),
                actual: top.frames(),
            });
        }

        let samples = base
            .samples()
            .iter()
            .zip(top.samples())
            .map(|(&a, &b)| self.clip.clip(a + b))
            .collect();

        Ok(AudioTrack::new(samples, base.sample_rate(), base.channels()))
    }

    /// Overlay the voiceover on the fitted music and append the tail
    ///
    /// `music` must already be exactly [`Mixer::required_frames`] long.
    pub fn mix(&self, voiceover: &AudioTrack, music: &AudioTrack) -> Result<AudioTrack, DuckingError> {
        let required = self.required_frames(voiceover);
        if music.frames() != required {
            return Err(DuckingError::LengthMismatch {
                expected: required,
                actual: music.frames(),
            });
        }

        let split = voiceover.frames();
        let bed = music.slice_frames(0, split);
        let mut output = self.overlay(voiceover, &bed)?;

        if required > split {
            output.append(&music.slice_frames(split, required))?;
        }

        Ok(output)
    }
}

fn check_format(voiceover: &AudioTrack, music: &AudioTrack) -> Result<(), DuckingError> {
    if voiceover.same_format(music) {
        Ok(())
    } else {
        Err(DuckingError::FormatMismatch {
            voice_rate: voiceover.sample_rate(),
            voice_channels: voiceover.channels(),
            music_rate: music.sample_rate(),
            music_channels: music.channels(),
        })
    }
}

/// Soft clip threshold - signal below this passes through untouched
const SOFT_CLIP_THRESHOLD: f32 = 0.75;
/// Soft clip ceiling - output never exceeds this magnitude
const SOFT_CLIP_CEILING: f32 = 0.89;

/// Gentle soft clipper for the overlay sum
///
/// Transparent below the threshold, then an exponential knee that
/// approaches the ceiling asymptotically.
#[inline(always)]
fn soft_clip(x: f32) -> f32 {
    let abs_x = x.abs();

    if abs_x <= SOFT_CLIP_THRESHOLD {
        return x;
    }

    let sign = x.signum();
    let knee_width = SOFT_CLIP_CEILING - SOFT_CLIP_THRESHOLD;
    let over = abs_x - SOFT_CLIP_THRESHOLD;
    let ratio = over / knee_width;

    let compressed = SOFT_CLIP_THRESHOLD + knee_width * (1.0 - (-ratio * 3.0).exp());
    sign * compressed.min(SOFT_CLIP_CEILING)
}
