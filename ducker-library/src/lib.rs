//! Track I/O for ducker - decoding, WAV export and configuration

mod config;
mod loader;
mod writer;

pub use config::{AppConfig, ConfigError};
pub use loader::{LoadError, LoadedTrack, TrackLoader, TrackMetadata};
pub use writer::{WavEncoding, WavExporter, WriteError};
