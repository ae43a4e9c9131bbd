//! Ducking envelope - silence intervals to a per-millisecond weight curve
//!
//! A weight of 0.0 means the music is fully ducked (voiceover speaking),
//! 1.0 means the music may play at full volume (voiceover silent). The
//! transition into and out of each silence interval is drawn by an
//! [`EnvelopeShape`], selected through [`EnvelopePolicy`].

use std::f32::consts::PI;

use ducker_analysis::SilenceInterval;

/// Envelope resolution in points per second (one point per millisecond)
pub const ENVELOPE_RATE: f64 = 1000.0;

/// Per-millisecond gain weights in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct WeightCurve {
    weights: Vec<f32>,
}

impl WeightCurve {
    /// Create an all-zero (fully ducked) curve
    pub fn ducked(len_ms: usize) -> Self {
        Self {
            weights: vec![0.0; len_ms],
        }
    }

    /// Wrap existing weights, clamping them into `[0, 1]`
    pub fn from_weights(weights: Vec<f32>) -> Self {
        Self {
            weights: weights.into_iter().map(|w| w.clamp(0.0, 1.0)).collect(),
        }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Length in milliseconds
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Append `tail_ms` milliseconds of full volume
    pub fn extend_full(&mut self, tail_ms: usize) {
        self.weights.resize(self.weights.len() + tail_ms, 1.0);
    }

    /// Extend by `points` copies of the last weight (0.0 if the curve is empty)
    pub fn extend_hold(&mut self, points: usize) {
        let last = self.weights.last().copied().unwrap_or(0.0);
        self.weights.resize(self.weights.len() + points, last);
    }
}

/// Strategy that raises the curve over one silence interval
///
/// `start` and `end` are the interval bounds in envelope points and may
/// fall outside the curve; implementations clamp to `[0, curve.len())`.
/// Implementations combine with existing values by element-wise maximum,
/// so an interval never lowers a region another interval already raised.
pub trait EnvelopeShape: Send + Sync {
    /// Raise the weights for the silence spanning `[start, end)`
    fn raise(&self, curve: &mut [f32], start: i64, end: i64);

    /// Get shape name
    fn name(&self) -> &'static str;
}

/// Raised-cosine rise over the silence widened by `transition` points each side
///
/// The weight follows `0.5 - 0.5 cos(pi t)` for `t` from 0 to 1 across the
/// widened span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricSine {
    /// Widening on each side, in envelope points
    pub transition: i64,
}

impl EnvelopeShape for SymmetricSine {
    fn raise(&self, curve: &mut [f32], start: i64, end: i64) {
        let len = curve.len() as i64;
        let lo = start.saturating_sub(self.transition).clamp(0, len) as usize;
        let hi = end.saturating_add(self.transition).clamp(0, len) as usize;
        if hi <= lo {
            return;
        }

        let span = hi - lo;
        let last = (span - 1).max(1) as f32;
        for (i, weight) in curve[lo..hi].iter_mut().enumerate() {
            let rise = 0.5 - 0.5 * (PI * i as f32 / last).cos();
            *weight = weight.max(rise);
        }
    }

    fn name(&self) -> &'static str {
        "symmetric-sine"
    }
}

/// Linear fade in and out, kept inside the silence interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerFade {
    /// Fade length in envelope points
    pub fade: i64,
}

impl EnvelopeShape for InnerFade {
    fn raise(&self, curve: &mut [f32], start: i64, end: i64) {
        let len = curve.len() as i64;
        let lo = start.clamp(0, len) as usize;
        let hi = end.clamp(0, len) as usize;
        if hi <= lo {
            return;
        }

        // Short intervals: fade-in and fade-out meet in the middle
        let fade = (self.fade.max(0) as usize).min((hi - lo) / 2);
        let last = (fade.saturating_sub(1)).max(1) as f32;

        for (i, weight) in curve[lo..hi].iter_mut().enumerate() {
            let from_end = hi - lo - 1 - i;
            let target = if i < fade {
                i as f32 / last
            } else if from_end < fade {
                from_end as f32 / last
            } else {
                1.0
            };
            *weight = weight.max(target.min(1.0));
        }
    }

    fn name(&self) -> &'static str {
        "inner-fade"
    }
}

/// Envelope transition policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopePolicy {
    /// Widen each silence by `transition_secs` and swell across it
    SymmetricSine { transition_secs: f64 },
    /// Fade within each silence over `fade_secs`
    InnerFade { fade_secs: f64 },
}

impl Default for EnvelopePolicy {
    fn default() -> Self {
        Self::symmetric_sine()
    }
}

impl EnvelopePolicy {
    /// Symmetric sine with the default 300ms transition
    pub fn symmetric_sine() -> Self {
        Self::SymmetricSine {
            transition_secs: 0.3,
        }
    }

    /// Inner fade with the default 100ms fade
    pub fn inner_fade() -> Self {
        Self::InnerFade { fade_secs: 0.1 }
    }

    /// Parse a policy name (`symmetric-sine` or `inner-fade`) with its default duration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "symmetric-sine" | "symmetric_sine" | "sine" => Some(Self::symmetric_sine()),
            "inner-fade" | "inner_fade" | "fade" => Some(Self::inner_fade()),
            _ => None,
        }
    }

    /// Get policy name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SymmetricSine { .. } => "symmetric-sine",
            Self::InnerFade { .. } => "inner-fade",
        }
    }

    /// Transition or fade duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match *self {
            Self::SymmetricSine { transition_secs } => transition_secs,
            Self::InnerFade { fade_secs } => fade_secs,
        }
    }

    /// Same policy with a different transition or fade duration
    pub fn with_duration_secs(self, secs: f64) -> Self {
        match self {
            Self::SymmetricSine { .. } => Self::SymmetricSine {
                transition_secs: secs,
            },
            Self::InnerFade { .. } => Self::InnerFade { fade_secs: secs },
        }
    }

    /// Build the shape implementing this policy
    pub fn shape(&self) -> Box<dyn EnvelopeShape> {
        let points = (self.duration_secs().max(0.0) * ENVELOPE_RATE) as i64;
        match self {
            Self::SymmetricSine { .. } => Box::new(SymmetricSine { transition: points }),
            Self::InnerFade { .. } => Box::new(InnerFade { fade: points }),
        }
    }
}

/// Builds weight curves from silence intervals
pub struct EnvelopeBuilder {
    shape: Box<dyn EnvelopeShape>,
}

impl EnvelopeBuilder {
    /// Create a builder for the given policy
    pub fn new(policy: EnvelopePolicy) -> Self {
        Self::with_shape(policy.shape())
    }

    /// Create a builder around a custom shape
    pub fn with_shape(shape: Box<dyn EnvelopeShape>) -> Self {
        Self { shape }
    }

    pub fn shape_name(&self) -> &'static str {
        self.shape.name()
    }

    /// Build a curve of `total_duration_ms` points
    ///
    /// Open-ended intervals close at the total duration. Bounds outside the
    /// track are clamped and inverted intervals contribute nothing. With no
    /// intervals the curve stays fully ducked.
    pub fn build(&self, total_duration_ms: u64, intervals: &[SilenceInterval]) -> WeightCurve {
        let mut curve = WeightCurve::ducked(total_duration_ms as usize);
        let total_secs = total_duration_ms as f64 / ENVELOPE_RATE;

        for interval in intervals {
            let closed = interval.close(total_secs);
            let start = to_point(closed.start_secs);
            let end = to_point(closed.end_secs);
            if end <= start {
                tracing::debug!(
                    "Skipping empty silence interval {:.3}s..{:.3}s",
                    closed.start_secs,
                    closed.end_secs
                );
                continue;
            }
            self.shape.raise(&mut curve.weights, start, end);
        }

        curve
    }
}

/// Seconds to an envelope point index, truncating toward zero
fn to_point(secs: f64) -> i64 {
    if secs.is_finite() {
        (secs * ENVELOPE_RATE) as i64
    } else if secs > 0.0 {
        i64::MAX / 2
    } else {
        0
    }
}
