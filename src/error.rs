use thiserror::Error;

#[derive(Error, Debug)]
pub enum SublateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Subtitle timing error: {0}")]
    Subtitle(String),

    #[error("Timeline integrity error: {0}")]
    Timeline(String),
}

pub type Result<T> = std::result::Result<T, SublateError>;
