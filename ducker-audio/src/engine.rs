//! Ducking engine - runs the full envelope, gain and mix pipeline
//!
//! The pipeline is a single synchronous pass:
//! silence intervals -> weight curve -> dB curve -> chunked gain on the
//! fitted music -> overlay with the voiceover (+ tail).
//!
//! Inputs are borrowed and never modified. Output is all-or-nothing: any
//! error aborts the run without returning partial audio.

use ducker_analysis::SilenceInterval;

use crate::config::DuckingConfig;
use crate::envelope::{EnvelopeBuilder, ENVELOPE_RATE};
use crate::error::{DuckingError, DuckingWarning};
use crate::gain::{ChunkedGainApplier, GainMapper};
use crate::mixer::Mixer;
use crate::track::AudioTrack;

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct DuckingOutput {
    /// The mixed voiceover and ducked music
    pub track: AudioTrack,
    /// Conditions the caller should surface to the user
    pub warnings: Vec<DuckingWarning>,
}

/// Envelope-driven ducking engine
pub struct DuckingEngine {
    config: DuckingConfig,
    envelope: EnvelopeBuilder,
    mapper: GainMapper,
    applier: ChunkedGainApplier,
    mixer: Mixer,
}

impl DuckingEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: DuckingConfig) -> Result<Self, DuckingError> {
        config.validate()?;
        Ok(Self {
            envelope: EnvelopeBuilder::new(config.envelope),
            mapper: GainMapper::new(config.duck_amount_db, config.gain_mapping),
            applier: ChunkedGainApplier::new(config.chunk_length_ms),
            mixer: Mixer::new(config.tail_ms(), config.clip),
            config,
        })
    }

    pub fn config(&self) -> &DuckingConfig {
        &self.config
    }

    /// Duck `music` under `voiceover` wherever the voiceover is not silent
    pub fn process(
        &self,
        voiceover: &AudioTrack,
        music: &AudioTrack,
        intervals: &[SilenceInterval],
    ) -> Result<DuckingOutput, DuckingError> {
        if voiceover.is_empty() {
            return Err(DuckingError::MissingInput("voiceover track is empty"));
        }
        if music.is_empty() {
            return Err(DuckingError::MissingInput("music track is empty"));
        }
        for track in [voiceover, music] {
            if track.sample_rate() == 0 {
                return Err(DuckingError::InvalidSampleRate(track.sample_rate()));
            }
        }

        let total_ms = voiceover.duration_ms();
        let tail_ms = self.config.tail_ms();
        tracing::info!(
            "Ducking {}ms voiceover ({} silence intervals, {} policy, {} dB, tail {}ms)",
            total_ms,
            intervals.len(),
            self.envelope.shape_name(),
            self.config.duck_amount_db,
            tail_ms
        );

        let mut warnings = Vec::new();
        if intervals.is_empty() {
            tracing::warn!("No silence periods detected; the output may not have any ducking effect");
            warnings.push(DuckingWarning::NoSilenceDetected);
        }
        for (index, interval) in intervals.iter().enumerate() {
            if needs_clamp(interval, total_ms) {
                tracing::debug!("Clamping silence interval #{} {:?}", index, interval);
                warnings.push(DuckingWarning::IntervalClamped {
                    index,
                    start_secs: interval.start_secs,
                    end_secs: interval.end_secs,
                });
            }
        }

        let mut curve = self.envelope.build(total_ms, intervals);
        // Cover a trailing partial millisecond with the last envelope value
        let partial_ms = voiceover.duration_ms_ceil() - total_ms;
        curve.extend_hold(partial_ms as usize);
        if tail_ms > 0 {
            curve.extend_full(tail_ms as usize);
        }
        let db_curve = self.mapper.to_decibels(&curve);

        let fitted = self.mixer.fit_music(voiceover, music)?;
        let adjusted = self.applier.apply(&fitted, &db_curve);
        let track = self.mixer.mix(voiceover, &adjusted)?;

        tracing::debug!(
            "Mixed {} frames ({} voiceover + {} tail)",
            track.frames(),
            voiceover.frames(),
            track.frames() - voiceover.frames()
        );

        Ok(DuckingOutput { track, warnings })
    }
}

/// Check if an interval lies partly outside `[0, total_ms]` or is inverted
fn needs_clamp(interval: &SilenceInterval, total_ms: u64) -> bool {
    let total_secs = total_ms as f64 / ENVELOPE_RATE;
    let closed = interval.close(total_secs);
    !closed.start_secs.is_finite()
        || !closed.end_secs.is_finite()
        || closed.start_secs < 0.0
        || closed.end_secs > total_secs
        || closed.start_secs >= closed.end_secs
}
