use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, SublateError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-acodec").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.arg("-c:v").arg("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.arg("-c:a").arg("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Seek to a position before decoding
    pub fn seek(self, seconds: f64) -> Self {
        self.arg("-ss").arg(seconds.to_string())
    }

    /// Limit output duration
    pub fn duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(seconds.to_string())
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        self.run().map(|_| ())
    }

    /// Execute the command and return its standard output
    pub async fn execute_capture(&self) -> Result<String> {
        let output = self.run()?;
        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }

    fn run(&self) -> Result<Vec<u8>> {
        debug!(
            "Executing media processing command: {} {:?}",
            self.binary_path, self.args
        );
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd
            .output()
            .map_err(|e| SublateError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SublateError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(output.stdout)
    }
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_binary_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_binary_path: probe_binary_path.into(),
        }
    }

    /// Build audio extraction command (MP3 demux)
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec("libmp3lame")
            .overwrite()
            .output(audio_path)
    }

    /// Build segment cut command (stream copy, no re-encode)
    pub fn cut_segment<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        start_secs: f64,
        length_secs: f64,
    ) -> MediaCommand {
        MediaCommand::new(
            &self.binary_path,
            format!("Segment cut ({}s from {}s)", length_secs, start_secs),
        )
        .seek(start_secs)
        .input(input_path)
        .duration(length_secs)
        .copy_video()
        .copy_audio()
        .overwrite()
        .output(output_path)
    }

    /// Build duration probe command
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_binary_path, "Duration probe")
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .output(media_path)
    }
}
