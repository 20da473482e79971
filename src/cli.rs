use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate an SRT subtitle file
    Translate {
        /// Input SRT file path
        input: PathBuf,

        /// Output SRT file path
        output: PathBuf,

        /// Source language code
        #[arg(long, default_value = "auto")]
        source: String,

        /// Target language code
        #[arg(long, default_value = "en")]
        target: String,

        /// Maximum requests per minute (default: from config)
        #[arg(long)]
        max_rpm: Option<usize>,

        /// Number of parallel requests (default: from config)
        #[arg(long)]
        parallel: Option<usize>,
    },

    /// Transcribe an audio file with whisper
    Transcribe {
        /// Input audio file path
        input: PathBuf,

        /// Whisper model to use (tiny, base, small, medium, large)
        #[arg(short, long)]
        model: Option<String>,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Output format (txt or srt with timestamps)
        #[arg(short, long, default_value = "txt")]
        format: String,
    },

    /// Extract audio from a video file
    Extract {
        /// Input video file path
        input: PathBuf,

        /// Output audio file path (default: {stem}_audio.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract audio from a video and transcribe it
    Process {
        /// Input video file path
        input: PathBuf,

        /// Output audio file path (default: {stem}_audio.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Output format (txt or srt with timestamps)
        #[arg(short, long, default_value = "txt")]
        format: String,
    },

    /// Extract on-screen text from a video into an SRT file
    ExtractText {
        /// Input video file path
        input: PathBuf,

        /// Output SRT file path (default: {stem}_extracted.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Duration of video segments in seconds (default: from config)
        #[arg(short = 'c', long)]
        chunk_duration: Option<u64>,

        /// Model name (default: from config)
        #[arg(short, long)]
        model: Option<String>,
    },
}
