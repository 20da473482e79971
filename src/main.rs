//! Sublate - Video-to-Subtitle Pipeline
//!
//! This is the main entry point for the Sublate application, which
//! translates subtitle files, transcribes audio, and extracts on-screen
//! text from video using whisper, ffmpeg, and the Gemini API.

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::{non_blocking, rolling};

use sublate::cli::{Args, Commands};
use sublate::config::Config;
use sublate::error::SublateError;
use sublate::workflow::{TranscriptFormat, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Sublate - Video-to-Subtitle Pipeline");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Execute command
    match args.command {
        Commands::Translate {
            input,
            output,
            source,
            target,
            max_rpm,
            parallel,
        } => {
            info!("Translating subtitles: {}", input.display());

            if let Some(max_rpm) = max_rpm {
                config.translate.max_requests_per_minute = max_rpm;
            }
            if let Some(parallel) = parallel {
                config.translate.parallel_requests = parallel;
            }

            let workflow = Workflow::new(config)?;
            workflow
                .translate_subtitles(&input, &output, &source, &target)
                .await?;
        }
        Commands::Transcribe {
            input,
            model,
            language,
            format,
        } => {
            info!("Transcribing audio: {}", input.display());

            if let Some(model) = model {
                config.transcriber.model = model;
            }
            let format = parse_transcript_format(&format)?;

            let workflow = Workflow::new(config)?;
            workflow
                .transcribe_audio(&input, language.as_deref(), format)
                .await?;
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());

            let workflow = Workflow::new(config)?;
            workflow.extract_audio(&input, output).await?;
        }
        Commands::Process {
            input,
            output,
            language,
            format,
        } => {
            info!("Processing video file: {}", input.display());

            let format = parse_transcript_format(&format)?;

            let workflow = Workflow::new(config)?;
            workflow
                .process_video(&input, output, language.as_deref(), format)
                .await?;
        }
        Commands::ExtractText {
            input,
            output,
            chunk_duration,
            model,
        } => {
            info!("Extracting on-screen text from: {}", input.display());

            let workflow = Workflow::new(config)?;
            workflow
                .extract_video_text(
                    &input,
                    output,
                    chunk_duration.map(std::time::Duration::from_secs),
                    model,
                )
                .await?;
        }
    }

    info!("Sublate workflow completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let sublate_dir = std::env::current_dir()?.join(".sublate");
    let log_dir = sublate_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "sublate.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer().with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Parse transcript output format from string
fn parse_transcript_format(format: &str) -> Result<TranscriptFormat> {
    match format.to_lowercase().as_str() {
        "txt" => Ok(TranscriptFormat::Text),
        "srt" => Ok(TranscriptFormat::Srt),
        _ => Err(SublateError::Config(format!(
            "Invalid output format '{}'. Valid formats: txt, srt",
            format
        ))
        .into()),
    }
}
