use async_trait::async_trait;
use tracing::debug;

use crate::chunk::normalize_separators;
use crate::dispatch::ChunkTransform;
use crate::error::Result;
use crate::gemini::GeminiClient;

/// Translates one subtitle chunk at a time through the Gemini API.
pub struct GeminiTranslator {
    client: GeminiClient,
    model: String,
    prompt: String,
}

impl GeminiTranslator {
    pub fn new(client: GeminiClient, model: String, prompt: String) -> Self {
        Self {
            client,
            model,
            prompt,
        }
    }

    /// Model output occasionally carries literal `\n` sequences and
    /// padded blank lines; bring it back to canonical SRT shape.
    fn clean_response(text: &str) -> String {
        normalize_separators(text.trim().replace("\\n", "\n").as_str())
    }
}

#[async_trait]
impl ChunkTransform for GeminiTranslator {
    async fn apply(&self, chunk: &str) -> Result<String> {
        debug!("Translating chunk of {} bytes", chunk.len());

        let prompt = format!("{}\n\n{}", self.prompt, chunk);
        let response = self.client.generate_text(&self.model, &prompt).await?;

        Ok(Self::clean_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_unescapes_literal_newlines() {
        assert_eq!(
            GeminiTranslator::clean_response("1\\n00:00:01,000 --> 00:00:03,000\\nHallo"),
            "1\n00:00:01,000 --> 00:00:03,000\nHallo"
        );
    }

    #[test]
    fn test_clean_response_normalizes_blank_lines() {
        assert_eq!(
            GeminiTranslator::clean_response("first\n\n\n\nsecond\n"),
            "first\n\nsecond"
        );
    }
}
