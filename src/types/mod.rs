use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Agent Card Types =============

/// A named capability exposed by an agent, addressable by its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Structured description of an agent: what it is, where it lives, and
/// what it can do.
///
/// `default_input_modes`, `default_output_modes` and `capabilities` are
/// opaque to the broker and are carried through unchanged so that cards
/// survive a store round-trip with full fidelity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub version: String,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_input_modes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_modes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<serde_json::Value>,
}

/// An agent as persisted by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredAgent {
    /// Caller-supplied unique identifier, `^[A-Za-z0-9_-]{1,64}$`.
    pub id: String,
    pub card: AgentCard,
    /// Classification tags; duplicates allowed, matched set-like.
    pub tags: Vec<String>,
    /// Dense embedding of the card text. Empty when no embedder is
    /// configured.
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============= Filter / Query Types =============

/// Criteria for listing or searching agents.
///
/// Nonempty dimensions combine with AND; within `tags` and `skills` any
/// single match suffices. `query` is a case-insensitive substring match
/// over card name and description in the in-memory store; the Qdrant
/// store answers it from its full-text index, which diverges on
/// tokenization.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub offset: usize,
    pub limit: usize,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
    pub query: String,
}

/// Page of agents plus the total match count before pagination.
#[derive(Debug, Clone)]
pub struct AgentListResult {
    pub agents: Vec<RegisteredAgent>,
    pub total: usize,
}

/// An agent paired with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredAgent {
    pub agent: RegisteredAgent,
    pub score: f32,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterAgentRequest {
    pub agent_id: String,
    pub agent_card: AgentCard,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAgentRequest {
    pub agent_card: AgentCard,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscoverRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentRecordResponse {
    pub agent_id: String,
    pub agent_card: AgentCard,
    /// The agent's URL, duplicated out of the card for convenience.
    pub endpoint: String,
    /// Skill ids, flattened out of the card.
    pub skills: Vec<String>,
    pub tags: Vec<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&RegisteredAgent> for AgentRecordResponse {
    fn from(agent: &RegisteredAgent) -> Self {
        Self {
            agent_id: agent.id.clone(),
            endpoint: agent.card.url.clone(),
            skills: agent.card.skills.iter().map(|s| s.id.clone()).collect(),
            agent_card: agent.card.clone(),
            tags: agent.tags.clone(),
            registered_at: agent.created_at,
            updated_at: agent.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentListResponse {
    pub agents: Vec<AgentRecordResponse>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationResponse {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScoredAgentResponse {
    pub agent: AgentRecordResponse,
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscoverResponse {
    pub agents: Vec<ScoredAgentResponse>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller-driven cancellation reported by a storage or embedding
    /// backend. Drop-based cancellation never produces this value; it
    /// surfaces only when a backend returns an explicit cancellation
    /// status instead of letting the future unwind.
    #[error("operation cancelled")]
    Cancelled,
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::Embedding(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "operation cancelled".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
