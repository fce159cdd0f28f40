//! In-memory agent store.
//!
//! Reference implementation backed by a `HashMap` behind a single
//! read-write lock. Search is exact cosine k-NN over all stored
//! embeddings, which keeps it the authoritative realization of the
//! ordering and filtering semantics the Qdrant store approximates.

use crate::db::traits::AgentStore;
use crate::types::{
    AgentFilter, AgentListResult, AppError, RegisteredAgent, Result, ScoredAgent,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Map-backed agent store. Data is lost when the process exits.
pub struct MemoryStore {
    agents: RwLock<HashMap<String, RegisteredAgent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Cosine similarity, accumulated in double precision.
    ///
    /// Mismatched dimensions and zero-norm vectors score 0 rather than
    /// erroring, so a single malformed embedding cannot fail a search.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let mut dot = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for (x, y) in a.iter().zip(b.iter()) {
            dot += f64::from(*x) * f64::from(*y);
            norm_a += f64::from(*x) * f64::from(*x);
            norm_b += f64::from(*y) * f64::from(*y);
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(agent: &RegisteredAgent, filter: &AgentFilter) -> bool {
    if !filter.tags.is_empty() {
        let has_tag = filter.tags.iter().any(|t| agent.tags.contains(t));
        if !has_tag {
            return false;
        }
    }

    if !filter.skills.is_empty() {
        let has_skill = filter
            .skills
            .iter()
            .any(|s| agent.card.skills.iter().any(|skill| &skill.id == s));
        if !has_skill {
            return false;
        }
    }

    if !filter.query.is_empty() {
        let query = filter.query.to_lowercase();
        if !agent.card.name.to_lowercase().contains(&query)
            && !agent.card.description.to_lowercase().contains(&query)
        {
            return false;
        }
    }

    true
}

#[async_trait]
impl AgentStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn create_agent(&self, agent: &RegisteredAgent) -> Result<()> {
        let mut agents = self.agents.write();
        if agents.contains_key(&agent.id) {
            return Err(AppError::AlreadyExists(format!(
                "agent '{}' already exists",
                agent.id
            )));
        }
        agents.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn get_agent(&self, id: &str) -> Result<RegisteredAgent> {
        let agents = self.agents.read();
        agents
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", id)))
    }

    async fn list_agents(&self, filter: &AgentFilter) -> Result<AgentListResult> {
        let agents = self.agents.read();

        let mut filtered: Vec<RegisteredAgent> = agents
            .values()
            .filter(|a| matches_filter(a, filter))
            .cloned()
            .collect();

        filtered.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = filtered.len();

        let start = filter.offset.min(total);
        let end = (start + filter.limit).min(total);

        Ok(AgentListResult {
            agents: filtered[start..end].to_vec(),
            total,
        })
    }

    async fn update_agent(&self, agent: &RegisteredAgent) -> Result<()> {
        let mut agents = self.agents.write();
        if !agents.contains_key(&agent.id) {
            return Err(AppError::NotFound(format!(
                "agent '{}' not found",
                agent.id
            )));
        }
        agents.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn delete_agent(&self, id: &str) -> Result<()> {
        let mut agents = self.agents.write();
        agents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", id)))
    }

    async fn search_agents(
        &self,
        query: &[f32],
        limit: usize,
        filter: &AgentFilter,
    ) -> Result<Vec<ScoredAgent>> {
        let agents = self.agents.read();

        let mut scored: Vec<ScoredAgent> = agents
            .values()
            .filter(|a| matches_filter(a, filter))
            .filter(|a| !a.embedding.is_empty())
            .map(|a| ScoredAgent {
                score: Self::cosine_similarity(query, &a.embedding),
                agent: a.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.agent.id.cmp(&b.agent.id))
        });

        if limit > 0 {
            scored.truncate(limit);
        }

        Ok(scored)
    }
}
