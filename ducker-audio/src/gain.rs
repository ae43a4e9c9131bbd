//! Weight curve to decibels, and chunked gain application

use crate::envelope::WeightCurve;
use crate::track::AudioTrack;

/// Convert dB to linear gain
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// How weights map to decibels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainMapping {
    /// Any weight above zero plays at 0 dB, zero weight gets the duck amount
    #[default]
    Binary,
    /// Interpolate between the duck amount (weight 0) and 0 dB (weight 1)
    Linear,
}

impl GainMapping {
    /// Parse a mapping name (`binary` or `linear`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "binary" => Some(Self::Binary),
            "linear" => Some(Self::Linear),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Linear => "linear",
        }
    }
}

/// Per-millisecond gain adjustment in dB, indexed like [`WeightCurve`]
#[derive(Debug, Clone, PartialEq)]
pub struct DecibelCurve {
    gains_db: Vec<f32>,
}

impl DecibelCurve {
    pub fn from_gains(gains_db: Vec<f32>) -> Self {
        Self { gains_db }
    }

    pub fn gains_db(&self) -> &[f32] {
        &self.gains_db
    }

    /// Length in milliseconds
    pub fn len(&self) -> usize {
        self.gains_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains_db.is_empty()
    }

    /// Mean gain over `[start_ms, end_ms)`
    ///
    /// Only points inside the curve are averaged. A range entirely past the
    /// end is treated as pass-through (0 dB).
    pub fn mean_db(&self, start_ms: usize, end_ms: usize) -> f32 {
        let end = end_ms.min(self.gains_db.len());
        if start_ms >= end {
            return 0.0;
        }
        let slice = &self.gains_db[start_ms..end];
        slice.iter().sum::<f32>() / slice.len() as f32
    }
}

/// Maps weight curves to decibel curves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainMapper {
    duck_amount_db: f32,
    mapping: GainMapping,
}

impl GainMapper {
    /// Create a mapper; `duck_amount_db` should be zero or negative
    pub fn new(duck_amount_db: f32, mapping: GainMapping) -> Self {
        Self {
            duck_amount_db,
            mapping,
        }
    }

    pub fn duck_amount_db(&self) -> f32 {
        self.duck_amount_db
    }

    pub fn mapping(&self) -> GainMapping {
        self.mapping
    }

    /// Map every weight to a gain in dB
    pub fn to_decibels(&self, curve: &WeightCurve) -> DecibelCurve {
        let duck = self.duck_amount_db;
        let gains_db = match self.mapping {
            GainMapping::Binary => curve
                .weights()
                .iter()
                .map(|&w| if w > 0.0 { 0.0 } else { duck })
                .collect(),
            GainMapping::Linear => curve
                .weights()
                .iter()
                .map(|&w| duck * (1.0 - w.clamp(0.0, 1.0)))
                .collect(),
        };
        DecibelCurve { gains_db }
    }
}

/// Binary thresholding of a weight curve
pub fn to_decibels(curve: &WeightCurve, duck_amount_db: f32) -> DecibelCurve {
    GainMapper::new(duck_amount_db, GainMapping::Binary).to_decibels(curve)
}

/// Applies a decibel curve to a track in fixed-length chunks
///
/// Each chunk gets one gain: the mean of the curve over the chunk's time
/// span. Fade precision is bounded by the chunk length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedGainApplier {
    chunk_length_ms: u64,
}

impl Default for ChunkedGainApplier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ChunkedGainApplier {
    /// Create an applier; a zero chunk length is raised to 1ms
    pub fn new(chunk_length_ms: u64) -> Self {
        Self {
            chunk_length_ms: chunk_length_ms.max(1),
        }
    }

    pub fn chunk_length_ms(&self) -> u64 {
        self.chunk_length_ms
    }

    /// Number of chunks covering `track`, the last one possibly partial
    ///
    /// A track without a sample rate has no time axis and gets no chunks.
    pub fn chunk_count(&self, track: &AudioTrack) -> usize {
        let frames = track.frames() as u64;
        let rate = track.sample_rate() as u64;
        if frames == 0 || rate == 0 {
            return 0;
        }
        // Chunk k starts inside the track while floor(k * L * rate / 1000) < frames
        let covered_ms = (frames * 1000).div_ceil(rate);
        covered_ms.div_ceil(self.chunk_length_ms) as usize
    }

    /// Gain for chunk `index` in dB
    pub fn chunk_gain_db(&self, curve: &DecibelCurve, index: usize) -> f32 {
        let len = self.chunk_length_ms as usize;
        let start = index.saturating_mul(len);
        curve.mean_db(start, start.saturating_add(len))
    }

    /// Apply the curve and return a new track of the same length
    pub fn apply(&self, music: &AudioTrack, curve: &DecibelCurve) -> AudioTrack {
        let ch = music.channels() as usize;
        let frames = music.frames();
        let mut samples = music.samples().to_vec();

        let chunks = self.chunk_count(music);
        for index in 0..chunks {
            let start_ms = index as u64 * self.chunk_length_ms;
            let start = music.ms_to_frames(start_ms);
            let end = music.ms_to_frames(start_ms + self.chunk_length_ms).min(frames);

            let gain_db = self.chunk_gain_db(curve, index);
            if gain_db == 0.0 {
                continue;
            }
            let gain = db_to_linear(gain_db);
            for sample in samples[start * ch..end * ch].iter_mut() {
                *sample *= gain;
            }
        }

        tracing::debug!(
            "Applied gain over {} chunks of {}ms ({} frames)",
            chunks,
            self.chunk_length_ms,
            frames
        );

        AudioTrack::new(samples, music.sample_rate(), music.channels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{EnvelopeBuilder, EnvelopePolicy};
    use ducker_analysis::SilenceInterval;

    #[test]
    fn test_binary_threshold() {
        let curve = WeightCurve::from_weights(vec![0.0, 0.001, 0.5, 1.0, 0.0]);
        let db = to_decibels(&curve, -10.0);
        assert_eq!(db.gains_db(), &[-10.0, 0.0, 0.0, 0.0, -10.0]);
    }

    #[test]
    fn test_binary_mapping_is_idempotent() {
        let builder = EnvelopeBuilder::new(EnvelopePolicy::inner_fade());
        let curve = builder.build(3000, &[SilenceInterval::new(0.5, 2.0)]);

        let once = to_decibels(&curve, -12.0);
        assert!(once.gains_db().iter().all(|&g| g == 0.0 || g == -12.0));

        // Thresholding the already-quantized result changes nothing
        let quantized = WeightCurve::from_weights(
            once.gains_db()
                .iter()
                .map(|&g| if g == 0.0 { 1.0 } else { 0.0 })
                .collect(),
        );
        let twice = to_decibels(&quantized, -12.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_duck_is_noop() {
        let curve = WeightCurve::ducked(10);
        let db = to_decibels(&curve, 0.0);
        assert!(db.gains_db().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_linear_mapping() {
        let mapper = GainMapper::new(-10.0, GainMapping::Linear);
        let curve = WeightCurve::from_weights(vec![0.0, 0.5, 1.0]);
        let db = mapper.to_decibels(&curve);
        assert_eq!(db.gains_db(), &[-10.0, -5.0, 0.0]);
    }

    #[test]
    fn test_mean_past_end_is_passthrough() {
        let db = DecibelCurve::from_gains(vec![-10.0; 150]);
        assert_eq!(db.mean_db(100, 200), -10.0);
        assert_eq!(db.mean_db(200, 300), 0.0);

        let mixed = DecibelCurve::from_gains(vec![0.0, -10.0]);
        assert_eq!(mixed.mean_db(0, 100), -5.0);
    }

    #[test]
    fn test_apply_preserves_length() {
        let applier = ChunkedGainApplier::new(100);
        let db = DecibelCurve::from_gains(vec![-6.0; 1000]);

        for frames in [0usize, 1, 4409, 4410, 44_100, 44_123] {
            let music = AudioTrack::silence(frames, 44_100, 2);
            let out = applier.apply(&music, &db);
            assert_eq!(out.frames(), frames);
            assert_eq!(out.samples().len(), music.samples().len());
        }
    }

    #[test]
    fn test_all_ducked_chunks() {
        // 10s track, no silence: every chunk at the duck amount
        let builder = EnvelopeBuilder::new(EnvelopePolicy::symmetric_sine());
        let curve = builder.build(10_000, &[]);
        let db = to_decibels(&curve, -10.0);
        let applier = ChunkedGainApplier::new(100);

        for k in 0..100 {
            assert_eq!(applier.chunk_gain_db(&db, k), -10.0);
        }

        let music = AudioTrack::new(vec![1.0; 10_000], 1000, 1);
        let out = applier.apply(&music, &db);
        let expected = db_to_linear(-10.0);
        assert!(out.samples().iter().all(|&s| (s - expected).abs() < 1e-6));
    }

    #[test]
    fn test_inner_fade_chunk_gains() {
        let builder = EnvelopeBuilder::new(EnvelopePolicy::InnerFade { fade_secs: 0.1 });
        let curve = builder.build(5000, &[SilenceInterval::new(1.0, 3.0)]);
        let db = to_decibels(&curve, -10.0);
        let applier = ChunkedGainApplier::new(100);

        for k in 0..50 {
            let gain = applier.chunk_gain_db(&db, k);
            let start_ms = k * 100;
            if (1100..2900).contains(&start_ms) {
                assert_eq!(gain, 0.0, "chunk {} should pass through", k);
            } else if start_ms < 1000 || start_ms >= 3000 {
                assert_eq!(gain, -10.0, "chunk {} should be ducked", k);
            } else {
                assert!(gain < 0.0 && gain > -10.0, "chunk {} should blend, got {}", k, gain);
            }
        }
    }

    #[test]
    fn test_chunk_count_closed_form() {
        let applier = ChunkedGainApplier::new(100);
        assert_eq!(applier.chunk_count(&AudioTrack::silence(44_100, 44_100, 2)), 10);
        assert_eq!(applier.chunk_count(&AudioTrack::silence(44_101, 44_100, 2)), 11);
        assert_eq!(applier.chunk_count(&AudioTrack::silence(2001, 2000, 1)), 11);
        assert_eq!(applier.chunk_count(&AudioTrack::silence(1, 8000, 1)), 1);
        assert_eq!(applier.chunk_count(&AudioTrack::silence(0, 8000, 1)), 0);
    }

    #[test]
    fn test_zero_sample_rate_has_no_chunks() {
        let applier = ChunkedGainApplier::new(100);
        let music = AudioTrack::new(vec![0.5; 100], 0, 1);
        assert_eq!(applier.chunk_count(&music), 0);

        let out = applier.apply(&music, &DecibelCurve::from_gains(vec![-10.0; 10]));
        assert_eq!(out, music);
    }

    #[test]
    fn test_partial_last_chunk_uses_in_range_points() {
        let applier = ChunkedGainApplier::new(100);
        let mut gains = vec![0.0; 1000];
        gains.extend(vec![-10.0; 50]);
        let db = DecibelCurve::from_gains(gains);

        // Chunk 10 covers 1000..1100 but the curve ends at 1050
        assert_eq!(applier.chunk_gain_db(&db, 10), -10.0);
        assert_eq!(applier.chunk_gain_db(&db, 11), 0.0);

        let music = AudioTrack::new(vec![1.0; 1050], 1000, 1);
        assert_eq!(applier.chunk_count(&music), 11);
        let out = applier.apply(&music, &db);
        assert_eq!(out.samples()[999], 1.0);
        assert!((out.samples()[1049] - db_to_linear(-10.0)).abs() < 1e-6);
    }
}
