//! H.E.R.M.E.S - Hybrid Embedding Registry & Matching Engine Server
//!
//! An agent broker: maintains a registry of autonomous agents described
//! by structured capability cards and answers discovery queries over
//! them with semantic similarity combined with structured filtering.

pub mod api;
pub mod db;
pub mod embedding;
pub mod registry;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use db::{AgentStore, MemoryStore, StoreProvider};
pub use embedding::{Embedder, HttpEmbedder};
pub use registry::RegistryService;
pub use types::{AppError, Result};

use crate::utils::config::Config;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn AgentStore>,
    pub registry: Arc<RegistryService>,
}
