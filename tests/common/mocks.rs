//! Mock implementations for testing.
//!
//! This module provides a deterministic mock embedder and card builders
//! that can be used across different test files without duplication.

use async_trait::async_trait;
use hermes::embedding::Embedder;
use hermes::types::{AgentCard, AgentSkill, AppError, Result};

/// Deterministic mock embedder keyed on keywords.
///
/// Each registered keyword maps to a fixed vector; `embed` returns the
/// vector of the first keyword contained in the input text, or the zero
/// vector when nothing matches. Identical texts always produce identical
/// embeddings, which is what the registry's derivation contract needs.
///
/// # Examples
///
/// ```rust,ignore
/// let embedder = MockEmbedder::new(4)
///     .with_keyword("alpha", vec![1.0, 0.0, 0.0, 0.0])
///     .with_keyword("gamma", vec![0.0, 1.0, 0.0, 0.0]);
/// ```
pub struct MockEmbedder {
    dimension: usize,
    keywords: Vec<(String, Vec<f32>)>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            keywords: Vec::new(),
        }
    }

    /// Map texts containing `keyword` to `vector`. Earlier registrations
    /// win when a text contains several keywords.
    pub fn with_keyword(mut self, keyword: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimension, "mock vector has wrong dimension");
        self.keywords.push((keyword.to_string(), vector));
        self
    }

    /// The standard alpha/beta/gamma fixture used by the discovery
    /// ranking tests (dimension 4).
    pub fn alpha_beta_gamma() -> Self {
        Self::new(4)
            .with_keyword("alpha", vec![1.0, 0.0, 0.0, 0.0])
            .with_keyword("beta", vec![0.7, 0.7, 0.0, 0.0])
            .with_keyword("gamma", vec![0.0, 1.0, 0.0, 0.0])
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        for (keyword, vector) in &self.keywords {
            if text.contains(keyword.as_str()) {
                return vector.clone();
            }
        }
        vec![0.0; self.dimension]
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}

/// Mock embedder that always fails, for exercising the `Embedding`
/// error path.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("mock embedder failure".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// Build a minimal valid agent card.
pub fn card(name: &str, description: &str) -> AgentCard {
    card_with_skills(name, description, &[("echo", "Echo")])
}

/// Build a valid agent card with the given `(id, name)` skills.
pub fn card_with_skills(name: &str, description: &str, skills: &[(&str, &str)]) -> AgentCard {
    AgentCard {
        name: name.to_string(),
        description: description.to_string(),
        url: format!("http://agents.local/{}", name.to_lowercase().replace(' ', "-")),
        version: "1.0".to_string(),
        skills: skills
            .iter()
            .map(|(id, skill_name)| AgentSkill {
                id: id.to_string(),
                name: skill_name.to_string(),
                description: String::new(),
                tags: vec![],
                examples: vec![],
            })
            .collect(),
        default_input_modes: None,
        default_output_modes: None,
        capabilities: None,
    }
}
