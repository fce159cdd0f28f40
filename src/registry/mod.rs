//! Agent registry service
//!
//! Business logic between the HTTP surface and the store: input
//! validation, embedding-text construction, CRUD orchestration and
//! semantic discovery. The service holds no cache; the store owns the
//! only persisted copy of every agent.

use crate::db::AgentStore;
use crate::embedding::Embedder;
use crate::types::{
    AgentCard, AgentFilter, AgentListResult, AppError, RegisteredAgent, Result, ScoredAgent,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const MAX_AGENT_ID_LEN: usize = 64;

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

const DEFAULT_DISCOVER_LIMIT: usize = 10;
const MAX_DISCOVER_LIMIT: usize = 50;

/// Input for registering a new agent.
#[derive(Debug, Clone)]
pub struct CreateInput {
    pub id: String,
    pub card: AgentCard,
    pub tags: Vec<String>,
}

/// Input for listing agents.
#[derive(Debug, Clone, Default)]
pub struct ListInput {
    pub offset: usize,
    pub limit: usize,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
    pub query: String,
}

/// Input for updating an existing agent.
#[derive(Debug, Clone)]
pub struct UpdateInput {
    pub id: String,
    pub card: AgentCard,
    pub tags: Vec<String>,
}

/// Input for semantic agent discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoverInput {
    pub query: String,
    pub limit: usize,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
}

/// Manages agent registrations over an injected store and an optional
/// embedder. Without an embedder, agents persist with empty embeddings
/// and discovery is unavailable.
pub struct RegistryService {
    store: Arc<dyn AgentStore>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn AgentStore>) -> Self {
        Self {
            store,
            embedder: None,
        }
    }

    /// Set the embedder used to vectorize agent cards and queries.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Register a new agent.
    ///
    /// Embedding happens before any store mutation, so an embedding
    /// failure leaves no partial state.
    pub async fn create(&self, input: CreateInput) -> Result<RegisteredAgent> {
        validate_agent_id(&input.id)?;
        validate_agent_card(&input.card)?;

        let embedding = self.embed_card(&input.card).await?;

        let now = now_secs();
        let agent = RegisteredAgent {
            id: input.id,
            card: input.card,
            tags: input.tags,
            embedding,
            created_at: now,
            updated_at: now,
        };

        self.store.create_agent(&agent).await?;
        tracing::info!(agent_id = %agent.id, "agent registered");

        Ok(agent)
    }

    /// Retrieve an agent by id.
    pub async fn get(&self, id: &str) -> Result<RegisteredAgent> {
        self.store.get_agent(id).await
    }

    /// List agents matching the criteria. `limit` is clamped to
    /// [1, 100] with a default of 20; negative offsets cannot be
    /// expressed.
    pub async fn list(&self, input: ListInput) -> Result<AgentListResult> {
        let limit = if input.limit == 0 {
            DEFAULT_LIST_LIMIT
        } else {
            input.limit.min(MAX_LIST_LIMIT)
        };

        self.store
            .list_agents(&AgentFilter {
                offset: input.offset,
                limit,
                tags: input.tags,
                skills: input.skills,
                query: input.query,
            })
            .await
    }

    /// Modify an existing agent. There are no upsert semantics: an
    /// unknown id fails with `NotFound` before any embedding work.
    pub async fn update(&self, input: UpdateInput) -> Result<RegisteredAgent> {
        validate_agent_card(&input.card)?;

        let mut existing = self.store.get_agent(&input.id).await?;

        let embedding = self.embed_card(&input.card).await?;

        existing.card = input.card;
        existing.tags = input.tags;
        existing.embedding = embedding;
        existing.updated_at = now_secs();

        self.store.update_agent(&existing).await?;
        tracing::info!(agent_id = %existing.id, "agent updated");

        Ok(existing)
    }

    /// Remove an agent.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_agent(id).await?;
        tracing::info!(agent_id = %id, "agent deleted");
        Ok(())
    }

    /// Find agents by semantic similarity to a natural-language query,
    /// optionally restricted by tags and skill ids. `limit` is clamped
    /// to [1, 50] with a default of 10.
    pub async fn discover(&self, input: DiscoverInput) -> Result<Vec<ScoredAgent>> {
        let limit = if input.limit == 0 {
            DEFAULT_DISCOVER_LIMIT
        } else {
            input.limit.min(MAX_DISCOVER_LIMIT)
        };

        let embedder = self.embedder.as_ref().ok_or_else(|| {
            AppError::Unavailable("discovery requires an embedder to be configured".into())
        })?;

        let embeddings = embedder.embed(&[input.query]).await?;
        let query_vector = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("no embedding returned for query".into()))?;

        self.store
            .search_agents(
                &query_vector,
                limit,
                &AgentFilter {
                    tags: input.tags,
                    skills: input.skills,
                    ..Default::default()
                },
            )
            .await
    }

    async fn embed_card(&self, card: &AgentCard) -> Result<Vec<f32>> {
        let Some(embedder) = self.embedder.as_ref() else {
            return Ok(Vec::new());
        };

        let embeddings = embedder.embed(&[build_embedding_text(card)]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("no embedding returned for card".into()))
    }
}

/// Current time truncated to whole seconds, the granularity the stores
/// persist.
fn now_secs() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

fn validate_agent_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(AppError::Validation("agent_id is required".into()));
    }
    if id.len() > MAX_AGENT_ID_LEN {
        return Err(AppError::Validation(format!(
            "agent_id must be at most {} characters",
            MAX_AGENT_ID_LEN
        )));
    }
    let valid = id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid {
        return Err(AppError::Validation(
            "agent_id must match pattern ^[A-Za-z0-9_-]+$".into(),
        ));
    }
    Ok(())
}

/// Validate required card fields, collecting every failure into one
/// message.
pub fn validate_agent_card(card: &AgentCard) -> Result<()> {
    let mut errs = Vec::new();

    if card.name.is_empty() {
        errs.push("name is required".to_string());
    }
    if card.url.is_empty() {
        errs.push("url is required".to_string());
    }
    if card.version.is_empty() {
        errs.push("version is required".to_string());
    }
    if card.skills.is_empty() {
        errs.push("at least one skill is required".to_string());
    }

    for (i, skill) in card.skills.iter().enumerate() {
        if skill.id.is_empty() {
            errs.push(format!("skill[{}].id is required", i));
        }
        if skill.name.is_empty() {
            errs.push(format!("skill[{}].name is required", i));
        }
    }

    if !errs.is_empty() {
        return Err(AppError::Validation(format!(
            "invalid agent card: {}",
            errs.join(", ")
        )));
    }
    Ok(())
}

/// Derive the text that gets embedded for a card: name, description and
/// every skill's name and description, space-joined, empty fields
/// skipped. Identical text yields identical embeddings under a
/// deterministic embedder.
pub fn build_embedding_text(card: &AgentCard) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if !card.name.is_empty() {
        parts.push(&card.name);
    }
    if !card.description.is_empty() {
        parts.push(&card.description);
    }
    for skill in &card.skills {
        if !skill.name.is_empty() {
            parts.push(&skill.name);
        }
        if !skill.description.is_empty() {
            parts.push(&skill.description);
        }
    }

    parts.join(" ")
}
