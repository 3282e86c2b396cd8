//! Deterministic text embedding with an LRU cache and a one-shot circuit breaker
//! (spec §4.1). Shared between the L3 semantic tier and the code index.

pub mod cache;
pub mod circuit_breaker;

use cache::EmbeddingCache;
use circuit_breaker::CircuitBreaker;

use crate::error::{Error, Result};

/// `embed`/`embed_batch` over a deterministic, dependency-free hashing embedder.
///
/// The vectors are not semantically meaningful in the way a trained model's are,
/// but they are stable, L2-comparable by cosine similarity, and require no model
/// download or training, matching the embedding-model-training Non-goal.
pub struct EmbeddingService {
    dimension: usize,
    cache: EmbeddingCache,
    breaker: CircuitBreaker,
}

impl EmbeddingService {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cache: EmbeddingCache::new(),
            breaker: CircuitBreaker::new(),
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Force the circuit open, as if model initialization had failed. Used by tests
    /// and by callers that detect the underlying model is unreachable.
    pub fn mark_unavailable(&self) {
        self.breaker.trip();
    }

    /// Clear a tripped circuit so subsequent calls reach the model again.
    pub fn reset(&self) {
        self.breaker.reset();
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.breaker.is_open()
    }

    /// Map a single text to a vector, consulting and populating the cache.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.breaker.is_open() {
            return Err(Error::EmbeddingUnavailable);
        }
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached);
        }
        let vector = hash_embed(text, self.dimension);
        self.cache.put(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Map a batch of texts to vectors, preserving input order in the output.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Deterministic, seedless hashing embedder: each token perturbs a fixed number of
/// buckets via FNV-1a, then the accumulated vector is L2-normalized so cosine
/// similarity behaves the way callers expect from a real embedding model.
fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut buckets = vec![0.0f32; dimension.max(1)];
    let normalized = text.to_lowercase();
    for token in normalized.split_whitespace() {
        let mut hash = fnv1a(token.as_bytes());
        for _ in 0..4 {
            hash = splitmix64(hash);
            let idx = (hash as usize) % buckets.len();
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            buckets[idx] += sign;
        }
    }
    l2_normalize(&mut buckets);
    buckets
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity between two vectors of equal length. Returns 0.0 for mismatched
/// lengths or zero vectors rather than panicking, since decay/recall must tolerate
/// corrupt or legacy-dimension embeddings (spec §4.4: "skipped with a warning").
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_within_process() {
        let svc = EmbeddingService::new(384);
        let a = svc.embed("hello world").unwrap();
        let b = svc.embed("hello world").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_preserves_order() {
        let svc = EmbeddingService::new(32);
        let texts = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let vectors = svc.embed_batch(&texts).unwrap();
        for (text, vector) in texts.iter().zip(&vectors) {
            assert_eq!(svc.embed(text).unwrap(), *vector);
        }
    }

    #[test]
    fn circuit_breaker_fails_fast_without_retry() {
        let svc = EmbeddingService::new(16);
        svc.mark_unavailable();
        assert!(matches!(svc.embed("x"), Err(Error::EmbeddingUnavailable)));
        assert!(matches!(svc.embed("x"), Err(Error::EmbeddingUnavailable)));
        svc.reset();
        assert!(svc.embed("x").is_ok());
    }

    #[test]
    fn cosine_similarity_identical_is_one() {
        let v = hash_embed("same text twice", 64);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cosine_similarity_mismatched_dims_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }
}
