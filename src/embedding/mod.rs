//! Embedding service client
//!
//! The broker never computes embeddings itself; it consumes the
//! `Embedder` capability. The production realization is an HTTP client
//! against a remote embedding service (`EMBEDDING_URL`), which keeps the
//! model weights, batching and hardware concerns out of this process.
//!
//! # Wire contract
//!
//! ```text
//! POST {base_url}/embed
//! {"texts": ["...", "..."]}
//!
//! 200 OK
//! {"embeddings": [[f32; D], [f32; D]]}
//! ```
//!
//! Responses are validated for count and dimension before use; anything
//! else surfaces as an `Embedding` error and the caller may retry.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text to fixed-dimension dense vectors, order preserving.
///
/// Implementations must be safe to invoke concurrently. The registry
/// performs no caching on top of this.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each text into a vector of `dimensions()` floats, one per
    /// input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of every vector this embedder produces.
    fn dimensions(&self) -> usize;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// HTTP client for a remote embedding service.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(base_url: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Embedding(format!(
                "embedding service returned {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("invalid embedding response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                body.embeddings.len()
            )));
        }

        for vector in &body.embeddings {
            if vector.len() != self.dimension {
                return Err(AppError::Embedding(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                )));
            }
        }

        Ok(body.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}
