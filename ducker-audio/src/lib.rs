//! Ducking engine for ducker - envelopes, chunked gain and mixing
//!
//! This module provides the offline ducking pipeline:
//! - Envelope: Silence intervals to a per-millisecond weight curve
//! - Gain: Weight to dB mapping and chunk-averaged gain application
//! - Mixer: Music looping, voiceover overlay and tail
//! - Engine: The full pipeline with configuration and warnings

mod config;
mod engine;
mod envelope;
mod error;
mod gain;
mod mixer;
mod track;

pub use config::DuckingConfig;
pub use engine::{DuckingEngine, DuckingOutput};
pub use envelope::{
    EnvelopeBuilder, EnvelopePolicy, EnvelopeShape, InnerFade, SymmetricSine, WeightCurve,
    ENVELOPE_RATE,
};
pub use error::{DuckingError, DuckingWarning};
pub use gain::{db_to_linear, to_decibels, ChunkedGainApplier, DecibelCurve, GainMapper, GainMapping};
pub use mixer::{ClipMode, Mixer};
pub use track::AudioTrack;
