use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Duck background music under a voiceover")]
pub struct Args {
    /// Voiceover audio file
    #[arg(value_name = "VOICEOVER", default_value = "voiceover.mp3")]
    pub voiceover: PathBuf,

    /// Background music audio file
    #[arg(value_name = "MUSIC", default_value = "music.mp3")]
    pub music: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "output_with_ducking.wav")]
    pub output: PathBuf,

    /// Path to a key=value config file (defaults to the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Music attenuation while the voiceover speaks, in dB
    #[arg(long, allow_hyphen_values = true)]
    pub duck_db: Option<f32>,

    /// Envelope policy: symmetric-sine or inner-fade
    #[arg(long)]
    pub policy: Option<String>,

    /// Transition (symmetric-sine) or fade (inner-fade) length in seconds
    #[arg(long)]
    pub transition: Option<f64>,

    /// Length of each uniform-gain chunk in milliseconds
    #[arg(long)]
    pub chunk_ms: Option<u64>,

    /// Seconds of music to keep playing after the voiceover ends
    #[arg(long)]
    pub tail: Option<f64>,

    /// Weight to dB mapping: binary or linear
    #[arg(long)]
    pub gain_mapping: Option<String>,

    /// Silence threshold in dBFS for the built-in detector
    #[arg(long, allow_hyphen_values = true)]
    pub threshold_db: Option<f32>,

    /// Minimum silence length in seconds for the built-in detector
    #[arg(long)]
    pub min_silence: Option<f64>,

    /// Read silence intervals from an ffmpeg silencedetect log instead of detecting them
    #[arg(long)]
    pub silence_log: Option<PathBuf>,

    /// Write 32-bit float WAV instead of 16-bit PCM
    #[arg(long, default_value_t = false)]
    pub float: bool,
}
