use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SublateError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub translate: TranslateConfig,
    pub transcriber: TranscriberConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API endpoint base URL
    pub endpoint: String,
    /// API key; falls back to the GEMINI_API_KEY environment variable
    pub api_key: Option<String>,
    /// Model used for subtitle translation
    pub translate_model: String,
    /// Model used for video text extraction
    pub extract_model: String,
    /// Timeout for ordinary generation requests (seconds)
    pub request_timeout_secs: u64,
    /// Timeout for extraction requests over a whole video segment (seconds)
    pub extract_timeout_secs: u64,
    /// Interval between file readiness polls (seconds)
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Maximum API requests per trailing minute
    pub max_requests_per_minute: usize,
    /// Number of parallel translation requests
    pub parallel_requests: usize,
    /// Chunk size budget in bytes; subtitle blocks are never split
    pub max_chunk_bytes: usize,
    /// Prompt template with {source_lang} and {target_lang} placeholders
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper binary
    pub binary_path: String,
    /// Whisper model name (tiny, base, small, medium, large)
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to the ffmpeg binary
    pub binary_path: String,
    /// Path to the ffprobe binary
    pub probe_binary_path: String,
    /// Videos longer than this are split into segments of this length (seconds)
    pub chunk_duration_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                api_key: None,
                translate_model: "gemini-1.5-flash".to_string(),
                extract_model: "gemini-1.5-pro".to_string(),
                request_timeout_secs: 300,
                extract_timeout_secs: 600,
                poll_interval_secs: 10,
            },
            translate: TranslateConfig {
                max_requests_per_minute: 15,
                parallel_requests: 5,
                max_chunk_bytes: 6500,
                prompt: None,
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper".to_string(),
                model: "small".to_string(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_binary_path: "ffprobe".to_string(),
                chunk_duration_secs: 1200,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SublateError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SublateError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Reject invalid settings before any external call is made.
    pub fn validate(&self) -> Result<()> {
        if self.translate.max_requests_per_minute == 0 {
            return Err(SublateError::Config(
                "max_requests_per_minute must be greater than zero".to_string(),
            ));
        }
        if self.translate.parallel_requests == 0 {
            return Err(SublateError::Config(
                "parallel_requests must be greater than zero".to_string(),
            ));
        }
        if self.translate.max_chunk_bytes == 0 {
            return Err(SublateError::Config(
                "max_chunk_bytes must be greater than zero".to_string(),
            ));
        }
        if self.media.chunk_duration_secs == 0 {
            return Err(SublateError::Config(
                "chunk_duration_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl GeminiConfig {
    /// API key from the config file, or from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        std::env::var("GEMINI_API_KEY").map_err(|_| {
            SublateError::Config("GEMINI_API_KEY not found in environment variables".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.translate.max_requests_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.translate.parallel_requests = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.media.chunk_duration_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            parsed.translate.max_requests_per_minute,
            config.translate.max_requests_per_minute
        );
        assert_eq!(parsed.media.chunk_duration_secs, config.media.chunk_duration_secs);
    }
}
