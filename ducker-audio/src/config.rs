//! Ducking parameters

use crate::envelope::EnvelopePolicy;
use crate::error::DuckingError;
use crate::gain::GainMapping;
use crate::mixer::ClipMode;

/// Parameters for a ducking run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuckingConfig {
    /// Music attenuation while the voiceover speaks, in dB (zero or negative)
    pub duck_amount_db: f32,
    /// Envelope transition shape and its duration
    pub envelope: EnvelopePolicy,
    /// Length of each uniform-gain chunk in milliseconds
    pub chunk_length_ms: u64,
    /// Music played on after the voiceover ends, in seconds
    pub tail_secs: f64,
    /// Weight to dB mapping
    pub gain_mapping: GainMapping,
    /// Clipping for the overlay region
    pub clip: ClipMode,
}

impl Default for DuckingConfig {
    fn default() -> Self {
        Self {
            duck_amount_db: -10.0,
            envelope: EnvelopePolicy::default(),
            chunk_length_ms: 100,
            tail_secs: 0.0,
            gain_mapping: GainMapping::default(),
            clip: ClipMode::default(),
        }
    }
}

impl DuckingConfig {
    /// Tail length in whole milliseconds
    pub fn tail_ms(&self) -> u64 {
        (self.tail_secs.max(0.0) * 1000.0).round() as u64
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), DuckingError> {
        if !self.duck_amount_db.is_finite() || self.duck_amount_db > 0.0 {
            return Err(DuckingError::InvalidConfig(format!(
                "duck amount must be zero or negative, got {} dB",
                self.duck_amount_db
            )));
        }
        if self.chunk_length_ms == 0 {
            return Err(DuckingError::InvalidConfig(
                "chunk length must be at least 1ms".to_string(),
            ));
        }
        if !self.tail_secs.is_finite() || self.tail_secs < 0.0 {
            return Err(DuckingError::InvalidConfig(format!(
                "tail length must be zero or positive, got {}s",
                self.tail_secs
            )));
        }
        let transition = self.envelope.duration_secs();
        if !transition.is_finite() || transition < 0.0 {
            return Err(DuckingError::InvalidConfig(format!(
                "{} duration must be zero or positive, got {}s",
                self.envelope.name(),
                transition
            )));
        }
        Ok(())
    }
}
