use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GeminiConfig;
use crate::error::{Result, SublateError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    pub fn file(file: &RemoteFile) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: file.mime_type.clone(),
                file_uri: file.uri.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

/// A file uploaded to the Gemini Files API. Video uploads are processed
/// asynchronously and must reach the Active state before use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    pub uri: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    pub state: FileState,
}

fn default_mime_type() -> String {
    "video/mp4".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

/// HTTP client for the generative language API: text generation plus the
/// Files API used for video-text extraction.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Generate text from a plain prompt.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
        };
        self.generate(model, request, None).await
    }

    /// Generate text from an uploaded file plus a prompt. Extraction over
    /// a full video segment can run long, so the timeout is explicit.
    pub async fn generate_with_file(
        &self,
        model: &str,
        file: &RemoteFile,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::file(file), Part::text(prompt)],
            }],
        };
        self.generate(model, request, Some(timeout)).await
    }

    async fn generate(
        &self,
        model: &str,
        request: GenerateContentRequest,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, model, self.api_key
        );

        debug!("Sending generateContent request to model {}", model);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SublateError::Gemini(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SublateError::Gemini(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SublateError::Gemini(format!("Failed to parse response: {}", e)))?;

        let text = generated
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SublateError::Gemini("Empty response received".to_string()));
        }

        Ok(text)
    }

    /// Upload a local file to the Files API.
    pub async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<RemoteFile> {
        let url = format!("{}/upload/v1beta/files?key={}", self.endpoint, self.api_key);

        info!("Uploading {} to the Files API", path.display());
        let bytes = tokio::fs::read(path).await?;

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| SublateError::Gemini(format!("File upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SublateError::Gemini(format!(
                "File upload error {}: {}",
                status, error_text
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| SublateError::Gemini(format!("Failed to parse upload response: {}", e)))?;

        Ok(uploaded.file)
    }

    /// Fetch the current metadata of an uploaded file.
    pub async fn get_file(&self, name: &str) -> Result<RemoteFile> {
        let url = format!("{}/v1beta/{}?key={}", self.endpoint, name, self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SublateError::Gemini(format!("File status request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SublateError::Gemini(format!(
                "File status error {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SublateError::Gemini(format!("Failed to parse file metadata: {}", e)))
    }

    /// Delete an uploaded file.
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        let url = format!("{}/v1beta/{}?key={}", self.endpoint, name, self.api_key);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| SublateError::Gemini(format!("File deletion failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SublateError::Gemini(format!(
                "File deletion error {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_serialization_omits_empty_fields() {
        let part = Part::text("hello");
        let json = serde_json::to_string(&part).unwrap();
        assert_eq!(json, r#"{"text":"hello"}"#);
    }

    #[test]
    fn test_file_state_deserialization() {
        let file: RemoteFile = serde_json::from_str(
            r#"{"name":"files/abc","uri":"https://example/files/abc","mimeType":"video/mp4","state":"PROCESSING"}"#,
        )
        .unwrap();
        assert_eq!(file.state, FileState::Processing);

        let file: RemoteFile = serde_json::from_str(
            r#"{"name":"files/abc","uri":"https://example/files/abc","state":"ACTIVE"}"#,
        )
        .unwrap();
        assert_eq!(file.state, FileState::Active);
        assert_eq!(file.mime_type, "video/mp4");
    }

    #[test]
    fn test_generate_response_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"first "},{"text":"second"}]}}]}"#,
        )
        .unwrap();
        let text: String = response.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "first second");
    }
}
