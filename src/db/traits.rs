//! Agent store abstraction
//!
//! This module provides the `AgentStore` trait that abstracts over the
//! storage backends for registered agents (in-memory map, Qdrant vector
//! database).
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes::db::{AgentStore, StoreProvider};
//!
//! // In-memory store (default for development/testing)
//! let store = StoreProvider::Memory.create_store().await?;
//!
//! // Qdrant store (requires a running server)
//! let store = StoreProvider::Qdrant {
//!     url: "http://localhost:6334".into(),
//!     api_key: None,
//!     collection: "agents".into(),
//!     dimension: 384,
//! }
//! .create_store()
//! .await?;
//! ```

use crate::types::{AgentFilter, AgentListResult, RegisteredAgent, Result, ScoredAgent};
use async_trait::async_trait;
use std::sync::Arc;

/// Store provider configuration.
#[derive(Debug, Clone, Default)]
pub enum StoreProvider {
    /// In-memory store (ephemeral, lost on restart).
    #[default]
    Memory,
    /// Qdrant vector database.
    #[cfg(feature = "qdrant")]
    Qdrant {
        /// Qdrant server URL (e.g., "http://localhost:6334").
        url: String,
        /// Optional API key for authentication.
        api_key: Option<String>,
        /// Name of the agents collection.
        collection: String,
        /// Embedding vector dimension for the collection.
        dimension: u64,
    },
}

impl StoreProvider {
    /// Create a store instance from this provider configuration.
    pub async fn create_store(&self) -> Result<Arc<dyn AgentStore>> {
        match self {
            StoreProvider::Memory => Ok(Arc::new(super::memory::MemoryStore::new())),

            #[cfg(feature = "qdrant")]
            StoreProvider::Qdrant {
                url,
                api_key,
                collection,
                dimension,
            } => {
                let store = super::qdrant::QdrantStore::connect(
                    url,
                    api_key.clone(),
                    collection,
                    *dimension,
                )
                .await?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Create a provider from environment variables.
    ///
    /// `QDRANT_URL` selects the Qdrant backend (with `QDRANT_API_KEY`,
    /// `QDRANT_COLLECTION` and `EMBEDDING_DIM` read alongside); otherwise
    /// the in-memory store is used.
    pub fn from_env() -> Self {
        #[cfg(feature = "qdrant")]
        if let Ok(url) = std::env::var("QDRANT_URL") {
            if !url.is_empty() {
                return StoreProvider::Qdrant {
                    url,
                    api_key: std::env::var("QDRANT_API_KEY").ok(),
                    collection: std::env::var("QDRANT_COLLECTION")
                        .unwrap_or_else(|_| "agents".into()),
                    dimension: std::env::var("EMBEDDING_DIM")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(384),
                };
            }
        }

        StoreProvider::Memory
    }
}

/// Abstract trait for agent storage operations.
///
/// Implementations must provide single-operation consistency per agent
/// id: concurrent creates on the same id resolve to one success and one
/// `AlreadyExists`.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) -> Result<()>;

    /// Store a new agent. Fails with `AlreadyExists` if the id is taken.
    async fn create_agent(&self, agent: &RegisteredAgent) -> Result<()>;

    /// Retrieve an agent by id, embedding included.
    async fn get_agent(&self, id: &str) -> Result<RegisteredAgent>;

    /// Return agents matching the filter, ordered by `created_at`
    /// descending (ties by id ascending), with `offset`/`limit` applied
    /// after ordering. `total` counts matches before pagination.
    async fn list_agents(&self, filter: &AgentFilter) -> Result<AgentListResult>;

    /// Overwrite an existing agent. Fails with `NotFound` if absent.
    async fn update_agent(&self, agent: &RegisteredAgent) -> Result<()>;

    /// Remove an agent. Fails with `NotFound` if absent.
    async fn delete_agent(&self, id: &str) -> Result<()>;

    /// Find agents by vector similarity, restricted to those matching
    /// the filter's tags/skills/query dimensions (offset/limit on the
    /// filter are ignored here; `limit` is the search k). Agents without
    /// an embedding are excluded.
    async fn search_agents(
        &self,
        query: &[f32],
        limit: usize,
        filter: &AgentFilter,
    ) -> Result<Vec<ScoredAgent>>;
}
