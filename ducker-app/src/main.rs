//! ducker - automatic music ducking
//!
//! Lowers a background music track wherever a voiceover speaks and
//! writes the mix to a WAV file.

mod cli;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ducker_analysis::{parse_silencedetect_log, SilenceDetector, SilenceInterval};
use ducker_audio::{AudioTrack, DuckingEngine, EnvelopePolicy, GainMapping};
use ducker_library::{AppConfig, TrackLoader, WavEncoding, WavExporter};

use cli::Args;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::load().context("Failed to read config")?,
    };
    apply_overrides(&args, &mut config)?;

    // Build the engine first so a bad configuration fails before any decoding
    let engine = DuckingEngine::new(config.ducking)?;

    let voiceover = TrackLoader::new()
        .load(&args.voiceover)
        .with_context(|| format!("Failed to load voiceover {}", args.voiceover.display()))?
        .track;
    let music = TrackLoader::matching(&voiceover)
        .load(&args.music)
        .with_context(|| format!("Failed to load music {}", args.music.display()))?
        .track;

    let intervals = silence_intervals(&args, &config, &voiceover)?;

    let output = engine.process(&voiceover, &music, &intervals)?;
    for warning in &output.warnings {
        tracing::warn!("{}", warning);
    }

    let encoding = if args.float {
        WavEncoding::Float32
    } else {
        WavEncoding::Int16
    };
    WavExporter::new(encoding)
        .write(&output.track, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Output file created: {}", args.output.display());
    Ok(())
}

/// Silence intervals from a silencedetect log if given, else from the voiceover itself
fn silence_intervals(
    args: &Args,
    config: &AppConfig,
    voiceover: &AudioTrack,
) -> anyhow::Result<Vec<SilenceInterval>> {
    if let Some(path) = &args.silence_log {
        let log = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read silence log {}", path.display()))?;
        let intervals = parse_silencedetect_log(&log);
        tracing::info!("Read {} silence intervals from {}", intervals.len(), path.display());
        return Ok(intervals);
    }

    let detector = SilenceDetector::new(config.silence);
    let intervals = detector.detect(
        voiceover.samples(),
        voiceover.sample_rate(),
        voiceover.channels(),
    )?;
    tracing::info!("Detected {} silence intervals in voiceover", intervals.len());
    Ok(intervals)
}

/// Apply command-line flags on top of the loaded config
fn apply_overrides(args: &Args, config: &mut AppConfig) -> anyhow::Result<()> {
    let ducking = &mut config.ducking;

    if let Some(name) = &args.policy {
        ducking.envelope = EnvelopePolicy::from_name(name)
            .ok_or_else(|| anyhow!("Unknown envelope policy: {}", name))?;
    }
    if let Some(secs) = args.transition {
        ducking.envelope = ducking.envelope.with_duration_secs(secs);
    }
    if let Some(db) = args.duck_db {
        ducking.duck_amount_db = db;
    }
    if let Some(ms) = args.chunk_ms {
        ducking.chunk_length_ms = ms;
    }
    if let Some(secs) = args.tail {
        ducking.tail_secs = secs;
    }
    if let Some(name) = &args.gain_mapping {
        ducking.gain_mapping = GainMapping::from_name(name)
            .ok_or_else(|| anyhow!("Unknown gain mapping: {}", name))?;
    }
    if let Some(db) = args.threshold_db {
        config.silence.threshold_db = db;
    }
    if let Some(secs) = args.min_silence {
        config.silence.min_silence_secs = secs;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names() {
        let args = Args::parse_from(["ducker"]);
        assert_eq!(args.voiceover.to_str(), Some("voiceover.mp3"));
        assert_eq!(args.music.to_str(), Some("music.mp3"));
        assert_eq!(args.output.to_str(), Some("output_with_ducking.wav"));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "ducker",
            "vo.wav",
            "bed.wav",
            "--duck-db",
            "-18",
            "--policy",
            "inner-fade",
            "--transition",
            "0.2",
            "--tail",
            "5",
            "--threshold-db",
            "-40",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&args, &mut config).unwrap();

        assert_eq!(config.ducking.duck_amount_db, -18.0);
        assert_eq!(
            config.ducking.envelope,
            EnvelopePolicy::InnerFade { fade_secs: 0.2 }
        );
        assert_eq!(config.ducking.tail_secs, 5.0);
        assert_eq!(config.silence.threshold_db, -40.0);
        assert_eq!(config.ducking.chunk_length_ms, 100);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let args = Args::parse_from(["ducker", "--policy", "cubic"]);
        let mut config = AppConfig::default();
        assert!(apply_overrides(&args, &mut config).is_err());
    }
}
