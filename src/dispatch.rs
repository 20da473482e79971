use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::chunk::Chunk;
use crate::error::Result;
use crate::limiter::RateLimiter;

/// The per-chunk operation handed to the dispatcher, typically a call to
/// an external translation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkTransform: Send + Sync {
    async fn apply(&self, chunk: &str) -> Result<String>;
}

/// Bounded worker pool mapping a transform over chunks.
///
/// Output order always equals input order: results are written to
/// index-addressed slots, so completion order does not matter. Each task
/// waits for a rate-limiter admission before touching the external
/// service. A failed chunk degrades to its original text instead of
/// aborting the document.
pub struct Dispatcher {
    parallel_requests: usize,
    limiter: Arc<RateLimiter>,
}

impl Dispatcher {
    pub fn new(parallel_requests: usize, limiter: Arc<RateLimiter>) -> Self {
        Self {
            parallel_requests,
            limiter,
        }
    }

    pub async fn map_ordered(
        &self,
        chunks: Vec<Chunk>,
        transform: Arc<dyn ChunkTransform>,
    ) -> Vec<String> {
        let originals: Vec<String> = chunks.iter().map(Chunk::text).collect();
        let mut results: Vec<Option<String>> = vec![None; originals.len()];

        let semaphore = Arc::new(Semaphore::new(self.parallel_requests));
        let mut tasks = JoinSet::new();

        for (index, text) in originals.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let limiter = Arc::clone(&self.limiter);
            let transform = Arc::clone(&transform);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                limiter.admit().await;
                debug!("Dispatching chunk {}", index + 1);
                (index, transform.apply(&text).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(transformed))) => {
                    results[index] = Some(transformed);
                }
                Ok((index, Err(e))) => {
                    warn!("Chunk {} failed, keeping original text: {}", index + 1, e);
                }
                Err(e) => {
                    warn!("Chunk task aborted: {}", e);
                }
            }
        }

        // Any slot still empty fell through the failure path above.
        results
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| originals[index].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::split_into_chunks;
    use crate::error::SublateError;
    use std::time::Duration;

    fn chunks_from(blocks: &[&str]) -> Vec<Chunk> {
        split_into_chunks(&blocks.join("\n\n"), 1)
    }

    fn generous_limiter() -> Arc<RateLimiter> {
        Arc::new(RateLimiter::per_minute(1000))
    }

    /// Sleeps longest for the first chunk so completions arrive in
    /// reverse submission order.
    struct ReverseDelay;

    #[async_trait]
    impl ChunkTransform for ReverseDelay {
        async fn apply(&self, chunk: &str) -> Result<String> {
            let rank: u64 = chunk.parse().unwrap();
            tokio::time::sleep(Duration::from_millis(100 - rank * 10)).await;
            Ok(format!("done-{}", chunk))
        }
    }

    struct FailOn(&'static str);

    #[async_trait]
    impl ChunkTransform for FailOn {
        async fn apply(&self, chunk: &str) -> Result<String> {
            if chunk == self.0 {
                Err(SublateError::Translation("simulated failure".to_string()))
            } else {
                Ok(chunk.to_uppercase())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_matches_input_order() {
        let dispatcher = Dispatcher::new(4, generous_limiter());
        let chunks = chunks_from(&["1", "2", "3", "4"]);

        let results = dispatcher.map_ordered(chunks, Arc::new(ReverseDelay)).await;

        assert_eq!(results, vec!["done-1", "done-2", "done-3", "done-4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_of_one_still_preserves_order() {
        let dispatcher = Dispatcher::new(1, generous_limiter());
        let chunks = chunks_from(&["1", "2", "3"]);

        let results = dispatcher.map_ordered(chunks, Arc::new(ReverseDelay)).await;

        assert_eq!(results, vec!["done-1", "done-2", "done-3"]);
    }

    #[tokio::test]
    async fn test_failed_chunk_keeps_original_text() {
        let dispatcher = Dispatcher::new(2, generous_limiter());
        let chunks = chunks_from(&["alpha", "beta", "gamma"]);

        let results = dispatcher
            .map_ordered(chunks, Arc::new(FailOn("beta")))
            .await;

        assert_eq!(results, vec!["ALPHA", "beta", "GAMMA"]);
    }

    #[tokio::test]
    async fn test_mocked_transform_is_applied_per_chunk() {
        let mut mock = MockChunkTransform::new();
        mock.expect_apply()
            .times(2)
            .returning(|chunk| Ok(format!("[{}]", chunk)));

        let dispatcher = Dispatcher::new(2, generous_limiter());
        let chunks = chunks_from(&["one", "two"]);

        let results = dispatcher.map_ordered(chunks, Arc::new(mock)).await;

        assert_eq!(results, vec!["[one]", "[two]"]);
    }
}
