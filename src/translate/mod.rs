// Subtitle translation pipeline
//
// Splits an SRT document into record-aligned chunks, fans them out over a
// bounded worker pool gated by the rate limiter, and reassembles the
// results in document order. A chunk whose translation fails keeps its
// original text.

pub mod gemini;

use std::sync::Arc;

use tracing::info;

use crate::chunk::{reassemble, split_into_chunks};
use crate::config::TranslateConfig;
use crate::dispatch::{ChunkTransform, Dispatcher};
use crate::error::Result;
use crate::limiter::RateLimiter;

pub use gemini::GeminiTranslator;

const DEFAULT_PROMPT: &str = "\
You are an expert translator. Your task is to translate the given subtitle text from {source_lang} to {target_lang}.
The input will be in SRT format. Only translate the text content, keeping all numbers, timestamps, and formatting intact.";

/// Fill the prompt template for a language pair.
pub fn build_prompt(template: Option<&str>, source_lang: &str, target_lang: &str) -> String {
    template
        .unwrap_or(DEFAULT_PROMPT)
        .replace("{source_lang}", source_lang)
        .replace("{target_lang}", target_lang)
}

pub struct SubtitleTranslator {
    dispatcher: Dispatcher,
    transform: Arc<dyn ChunkTransform>,
    max_chunk_bytes: usize,
}

impl SubtitleTranslator {
    pub fn new(config: &TranslateConfig, transform: Arc<dyn ChunkTransform>) -> Self {
        let limiter = Arc::new(RateLimiter::per_minute(config.max_requests_per_minute));

        Self {
            dispatcher: Dispatcher::new(config.parallel_requests, limiter),
            transform,
            max_chunk_bytes: config.max_chunk_bytes,
        }
    }

    /// Translate a whole SRT document, preserving block order.
    pub async fn translate_document(&self, content: &str) -> Result<String> {
        let chunks = split_into_chunks(content, self.max_chunk_bytes);
        info!("Split content into {} chunks", chunks.len());

        let translated = self.dispatcher.map_ordered(chunks, Arc::clone(&self.transform)).await;

        Ok(reassemble(&translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MockChunkTransform;

    #[test]
    fn test_build_prompt_substitutes_languages() {
        let prompt = build_prompt(None, "auto", "de");
        assert!(prompt.contains("from auto to de"));

        let prompt = build_prompt(Some("translate {source_lang}->{target_lang}"), "en", "ja");
        assert_eq!(prompt, "translate en->ja");
    }

    #[tokio::test]
    async fn test_translate_document_keeps_block_order() {
        let mut mock = MockChunkTransform::new();
        mock.expect_apply()
            .returning(|chunk| Ok(chunk.to_uppercase()));

        let config = TranslateConfig {
            max_requests_per_minute: 1000,
            parallel_requests: 3,
            max_chunk_bytes: 1,
            prompt: None,
        };
        let translator = SubtitleTranslator::new(&config, Arc::new(mock));

        let translated = translator
            .translate_document("first block\n\nsecond block\n\nthird block")
            .await
            .unwrap();

        assert_eq!(translated, "FIRST BLOCK\n\nSECOND BLOCK\n\nTHIRD BLOCK");
    }
}
