use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service. Unset means no embedder is
    /// configured and discovery is unavailable.
    pub url: Option<String>,
    /// Vector dimension the embedding service produces.
    pub dimension: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
            },
            embedding: EmbeddingConfig {
                url: env::var("EMBEDDING_URL").ok().filter(|v| !v.is_empty()),
                dimension: env::var("EMBEDDING_DIM")
                    .unwrap_or_else(|_| "384".to_string())
                    .parse()?,
            },
        })
    }
}
