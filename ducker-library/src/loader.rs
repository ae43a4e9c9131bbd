//! Audio file loading and decoding

use ducker_audio::AudioTrack;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur during track loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Resample error: {0}")]
    Resample(String),
    #[error("File decoded to zero samples")]
    Empty,
}

/// Track metadata
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata {
    pub title: String,
    pub duration_secs: f64,
    /// Sample rate of the file before any resampling
    pub source_sample_rate: u32,
    pub channels: u16,
}

/// A loaded and decoded audio track
pub struct LoadedTrack {
    /// Decoded audio, resampled if the loader has a target rate
    pub track: AudioTrack,
    /// Track metadata
    pub metadata: TrackMetadata,
}

/// Audio file loader using Symphonia
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackLoader {
    target_sample_rate: Option<u32>,
    target_channels: Option<u16>,
}

impl TrackLoader {
    /// Create a loader that keeps each file's native format
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that resamples to a specific sample rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self {
            target_sample_rate: Some(target_sample_rate),
            target_channels: None,
        }
    }

    /// Create a loader that converts to the format of `reference`
    pub fn matching(reference: &AudioTrack) -> Self {
        Self {
            target_sample_rate: Some(reference.sample_rate()),
            target_channels: Some(reference.channels()),
        }
    }

    /// Load and decode an audio file
    pub fn load(&self, path: &Path) -> Result<LoadedTrack, LoadError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let detected = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::UnsupportedFormat(e.to_string()))?;

        let mut format = detected.format;

        // Find first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut metadata = TrackMetadata {
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string(),
            source_sample_rate,
            channels,
            ..Default::default()
        };

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match next_packet_or_end(format.next_packet())? {
                Some(p) => p,
                None => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("Skipping corrupt packet: {}", e);
                    continue;
                }
                Err(e) => return Err(LoadError::Decode(e.to_string())),
            };

            // Convert to f32 interleaved
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        if samples.is_empty() {
            return Err(LoadError::Empty);
        }

        let total_frames = samples.len() / channels.max(1) as usize;
        metadata.duration_secs = total_frames as f64 / source_sample_rate as f64;

        let (samples, final_sample_rate) = match self.target_sample_rate {
            Some(target) if target != source_sample_rate => {
                (resample(&samples, source_sample_rate, target, channels)?, target)
            }
            _ => (samples, source_sample_rate),
        };

        let mut track = AudioTrack::new(samples, final_sample_rate, channels);
        if let Some(target) = self.target_channels {
            track = track.with_channels(target);
        }

        tracing::info!(
            "Loaded {} ({:.2}s, {} Hz -> {} Hz, {} ch)",
            path.display(),
            metadata.duration_secs,
            source_sample_rate,
            track.sample_rate(),
            track.channels()
        );

        Ok(LoadedTrack { track, metadata })
    }
}

/// Resample interleaved audio to `target_rate`
fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
    channels: u16,
) -> Result<Vec<f32>, LoadError> {
    use rubato::{FftFixedInOut, Resampler};

    let channels_usize = channels.max(1) as usize;
    let frames = samples.len() / channels_usize;

    let mut resampler = FftFixedInOut::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        1024,
        channels_usize,
    )
    .map_err(|e| LoadError::Resample(e.to_string()))?;

    // Deinterleave
    let deinterleaved: Vec<Vec<f32>> = (0..channels_usize)
        .map(|ch| {
            (0..frames)
                .map(|f| samples[f * channels_usize + ch])
                .collect()
        })
        .collect();

    let chunk_size = resampler.input_frames_next();
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels_usize];

    let mut pos = 0;
    while pos + chunk_size <= frames {
        let input_refs: Vec<&[f32]> = deinterleaved
            .iter()
            .map(|ch| &ch[pos..pos + chunk_size])
            .collect();

        let resampled = resampler
            .process(&input_refs, None)
            .map_err(|e| LoadError::Resample(e.to_string()))?;

        for (ch, data) in resampled.into_iter().enumerate() {
            output[ch].extend(data);
        }

        pos += chunk_size;
    }

    // Last partial chunk: zero-pad, keep only the proportional output
    if pos < frames {
        let remaining = frames - pos;
        let padded: Vec<Vec<f32>> = deinterleaved
            .iter()
            .map(|ch| {
                let mut v = ch[pos..].to_vec();
                v.resize(chunk_size, 0.0);
                v
            })
            .collect();

        let input_refs: Vec<&[f32]> = padded.iter().map(|v| v.as_slice()).collect();

        let resampled = resampler
            .process(&input_refs, None)
            .map_err(|e| LoadError::Resample(e.to_string()))?;
        let output_frames = remaining * target_rate as usize / source_rate as usize;
        for (ch, data) in resampled.into_iter().enumerate() {
            output[ch].extend(&data[..output_frames.min(data.len())]);
        }
    }

    // Reinterleave
    let output_frames = output[0].len();
    let mut interleaved = Vec::with_capacity(output_frames * channels_usize);
    for frame_idx in 0..output_frames {
        for channel in &output {
            interleaved.push(channel[frame_idx]);
        }
    }

    Ok(interleaved)
}

/// Map a demuxer read to the next packet, `None` at end of stream
///
/// Only an unexpected EOF ends the stream; any other error fails the load
/// rather than returning a truncated track.
fn next_packet_or_end(
    result: Result<Packet, SymphoniaError>,
) -> Result<Option<Packet>, LoadError> {
    match result {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        Err(e) => Err(LoadError::Decode(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_stream_stops_cleanly() {
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "end of stream");
        assert!(matches!(
            next_packet_or_end(Err(SymphoniaError::IoError(eof))),
            Ok(None)
        ));

        let packet = Packet::new_from_slice(0, 0, 0, &[1, 2, 3]);
        assert!(matches!(next_packet_or_end(Ok(packet)), Ok(Some(_))));
    }

    #[test]
    fn test_demux_errors_fail_the_load() {
        assert!(matches!(
            next_packet_or_end(Err(SymphoniaError::DecodeError("malformed frame header"))),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            next_packet_or_end(Err(SymphoniaError::ResetRequired)),
            Err(LoadError::Decode(_))
        ));

        let broken = std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt container");
        assert!(matches!(
            next_packet_or_end(Err(SymphoniaError::IoError(broken))),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = TrackLoader::new();
        let result = loader.load(Path::new("/nonexistent/voiceover.mp3"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_resample_length_is_proportional() {
        let samples = vec![0.25f32; 48_000 * 2];
        let out = resample(&samples, 48_000, 24_000, 2).unwrap();

        let frames = out.len() / 2;
        // Within one resampler block of the exact half length
        assert!((frames as i64 - 24_000).abs() <= 1024, "got {} frames", frames);
        assert_eq!(out.len() % 2, 0);
    }

    #[test]
    fn test_matching_loader_targets_reference() {
        let reference = AudioTrack::silence(10, 22_050, 1);
        let loader = TrackLoader::matching(&reference);
        assert_eq!(loader.target_sample_rate, Some(22_050));
        assert_eq!(loader.target_channels, Some(1));
    }
}
