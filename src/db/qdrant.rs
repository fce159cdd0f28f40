//! Qdrant-backed agent store.
//!
//! Persists each agent as a single point: the vector is the card
//! embedding, the payload carries the agent material. Point ids are
//! random UUIDs generated at creation time; the caller-facing agent id
//! lives only in the payload behind a keyword index, so updates can
//! reuse the point id and id lookups are ordinary filtered scrolls.
//!
//! Payload layout:
//!
//! | field              | type            | index      |
//! |--------------------|-----------------|------------|
//! | `id`               | keyword         | exact      |
//! | `tags`             | keyword list    | exact      |
//! | `skill_ids`        | keyword list    | exact      |
//! | `card_name`        | text            | full-text  |
//! | `card_description` | text            | full-text  |
//! | `card`             | JSON string     | none       |
//! | `created_at`       | integer seconds | range      |
//! | `updated_at`       | integer seconds | range      |

use crate::db::traits::AgentStore;
use crate::types::{
    AgentCard, AgentFilter, AgentListResult, AppError, RegisteredAgent, Result, ScoredAgent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::{
    qdrant::{
        condition::ConditionOneOf, payload_index_params::IndexParams, point_id::PointIdOptions,
        r#match::MatchValue, Condition, CreateCollectionBuilder,
        CreateFieldIndexCollectionBuilder, DeletePointsBuilder, Distance, FieldCondition,
        FieldType, Filter, IntegerIndexParams, Match, PointId, PointStruct,
        QueryPointsBuilder, RetrievedPoint, ScrollPointsBuilder, UpsertPointsBuilder,
        VectorParamsBuilder,
    },
    Qdrant,
};
use std::collections::HashMap;
use uuid::Uuid;

const SCROLL_BATCH_SIZE: u32 = 100;

/// Agent store backed by a Qdrant collection.
///
/// Requires a running Qdrant instance. All writes use `wait=true` so a
/// subsequent read observes them.
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
}

impl QdrantStore {
    /// Connect to Qdrant, verify reachability, and bootstrap the agents
    /// collection and its payload indexes if absent.
    pub async fn connect(
        url: &str,
        api_key: Option<String>,
        collection: &str,
        dimension: u64,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(AppError::Configuration(
                "vector dimension must be set for the Qdrant store".into(),
            ));
        }

        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Store(format!("failed to create Qdrant client: {}", e)))?;

        let store = Self {
            client,
            collection: collection.to_string(),
        };

        store.ping().await?;
        store.ensure_collection(dimension).await?;

        Ok(store)
    }

    /// Create the collection and its payload indexes if missing.
    /// Safe to call on every startup.
    async fn ensure_collection(&self, dimension: u64) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| AppError::Store(format!("failed to check collection: {}", e)))?;

        if exists {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
            )
            .await
            .map_err(|e| AppError::Store(format!("failed to create collection: {}", e)))?;

        for field in ["id", "tags", "skill_ids"] {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    field,
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| {
                    AppError::Store(format!("failed to create {} index: {}", field, e))
                })?;
        }

        for field in ["card_name", "card_description"] {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    field,
                    FieldType::Text,
                ))
                .await
                .map_err(|e| {
                    AppError::Store(format!("failed to create {} index: {}", field, e))
                })?;
        }

        // Integer indexes with range support, used for ordering.
        for field in ["created_at", "updated_at"] {
            self.client
                .create_field_index(
                    CreateFieldIndexCollectionBuilder::new(
                        &self.collection,
                        field,
                        FieldType::Integer,
                    )
                    .field_index_params(IndexParams::IntegerIndexParams(IntegerIndexParams {
                        lookup: Some(true),
                        range: Some(true),
                        ..Default::default()
                    })),
                )
                .await
                .map_err(|e| {
                    AppError::Store(format!("failed to create {} index: {}", field, e))
                })?;
        }

        Ok(())
    }

    /// Look up the point holding the given agent id, payload and vector
    /// included.
    async fn find_point_by_agent_id(&self, agent_id: &str) -> Result<Option<RetrievedPoint>> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection)
                    .filter(Filter::must(vec![keyword_match("id", agent_id)]))
                    .limit(1)
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(|e| AppError::Store(format!("failed to scroll: {}", e)))?;

        Ok(response.result.into_iter().next())
    }

    /// Fetch every point matching the filter, batch by batch.
    async fn scroll_all(&self, filter: Option<Filter>) -> Result<Vec<RetrievedPoint>> {
        let mut points = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_BATCH_SIZE)
                .with_payload(true);
            if let Some(f) = filter.clone() {
                builder = builder.filter(f);
            }
            if let Some(o) = offset.take() {
                builder = builder.offset(o);
            }

            let response = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| AppError::Store(format!("failed to scroll: {}", e)))?;

            points.extend(response.result);

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(points)
    }

    async fn upsert_point(&self, point_id: PointId, agent: &RegisteredAgent) -> Result<()> {
        let payload = agent_to_payload(agent)?;
        let point = PointStruct::new(point_id, agent.embedding.clone(), payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| AppError::Store(format!("failed to upsert point: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl AgentStore for QdrantStore {
    async fn ping(&self) -> Result<()> {
        self.client
            .health_check()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Store(format!("qdrant health check failed: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        // The client releases its channel on drop; nothing to flush.
        Ok(())
    }

    async fn create_agent(&self, agent: &RegisteredAgent) -> Result<()> {
        if self.find_point_by_agent_id(&agent.id).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "agent '{}' already exists",
                agent.id
            )));
        }

        let point_id = PointId {
            point_id_options: Some(PointIdOptions::Uuid(Uuid::new_v4().to_string())),
        };
        self.upsert_point(point_id, agent).await
    }

    async fn get_agent(&self, id: &str) -> Result<RegisteredAgent> {
        let point = self
            .find_point_by_agent_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", id)))?;

        let mut agent = payload_to_agent(&point.payload)?;
        agent.embedding = dense_vector_output(point.vectors);
        Ok(agent)
    }

    async fn list_agents(&self, filter: &AgentFilter) -> Result<AgentListResult> {
        let points = self.scroll_all(build_filter(filter)).await?;

        let mut agents = Vec::with_capacity(points.len());
        for point in &points {
            agents.push(payload_to_agent(&point.payload)?);
        }

        // Qdrant scroll order is by point id; re-establish the contract
        // order before paginating.
        agents.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = agents.len();
        let start = filter.offset.min(total);
        let end = (start + filter.limit).min(total);

        Ok(AgentListResult {
            agents: agents[start..end].to_vec(),
            total,
        })
    }

    async fn update_agent(&self, agent: &RegisteredAgent) -> Result<()> {
        let point = self
            .find_point_by_agent_id(&agent.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", agent.id)))?;

        let point_id = point
            .id
            .ok_or_else(|| AppError::Store("point without id in scroll result".into()))?;

        self.upsert_point(point_id, agent).await
    }

    async fn delete_agent(&self, id: &str) -> Result<()> {
        let point = self
            .find_point_by_agent_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("agent '{}' not found", id)))?;

        let point_id = point
            .id
            .ok_or_else(|| AppError::Store("point without id in scroll result".into()))?;

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(vec![point_id])
                    .wait(true),
            )
            .await
            .map_err(|e| AppError::Store(format!("failed to delete point: {}", e)))?;

        Ok(())
    }

    async fn search_agents(
        &self,
        query: &[f32],
        limit: usize,
        filter: &AgentFilter,
    ) -> Result<Vec<ScoredAgent>> {
        let mut builder = QueryPointsBuilder::new(&self.collection)
            .query(query.to_vec())
            .limit(limit as u64)
            .with_payload(true)
            .with_vectors(true);
        if let Some(f) = build_filter(filter) {
            builder = builder.filter(f);
        }

        let response = self
            .client
            .query(builder)
            .await
            .map_err(|e| AppError::Store(format!("failed to query: {}", e)))?;

        let mut scored = Vec::with_capacity(response.result.len());
        for point in response.result {
            let mut agent = payload_to_agent(&point.payload)?;
            agent.embedding = dense_vector_output(point.vectors);
            scored.push(ScoredAgent {
                agent,
                score: point.score,
            });
        }

        Ok(scored)
    }
}

// ============================================================================
// Payload / Filter Translation
// ============================================================================

fn agent_to_payload(
    agent: &RegisteredAgent,
) -> Result<HashMap<String, qdrant_client::qdrant::Value>> {
    let card_json = serde_json::to_string(&agent.card)
        .map_err(|e| AppError::Store(format!("failed to serialize agent card: {}", e)))?;

    let skill_ids: Vec<String> = agent.card.skills.iter().map(|s| s.id.clone()).collect();

    let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
    payload.insert("id".to_string(), agent.id.clone().into());
    payload.insert("card".to_string(), card_json.into());
    payload.insert("card_name".to_string(), agent.card.name.clone().into());
    payload.insert(
        "card_description".to_string(),
        agent.card.description.clone().into(),
    );
    payload.insert(
        "tags".to_string(),
        serde_json::to_value(&agent.tags)
            .unwrap_or(serde_json::Value::Null)
            .into(),
    );
    payload.insert(
        "skill_ids".to_string(),
        serde_json::to_value(&skill_ids)
            .unwrap_or(serde_json::Value::Null)
            .into(),
    );
    payload.insert(
        "created_at".to_string(),
        agent.created_at.timestamp().into(),
    );
    payload.insert(
        "updated_at".to_string(),
        agent.updated_at.timestamp().into(),
    );

    Ok(payload)
}

fn payload_to_agent(
    payload: &HashMap<String, qdrant_client::qdrant::Value>,
) -> Result<RegisteredAgent> {
    let id = payload
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Store("payload missing agent id".into()))?;

    let card_json = payload
        .get("card")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Store(format!("payload for '{}' missing card", id)))?;
    let card: AgentCard = serde_json::from_str(card_json)
        .map_err(|e| AppError::Store(format!("failed to parse card for '{}': {}", id, e)))?;

    let tags: Vec<String> = payload
        .get("tags")
        .and_then(|v| serde_json::from_value(v.clone().into()).ok())
        .unwrap_or_default();

    let created_at = timestamp_field(payload, "created_at");
    let updated_at = timestamp_field(payload, "updated_at");

    Ok(RegisteredAgent {
        id,
        card,
        tags,
        embedding: Vec::new(),
        created_at,
        updated_at,
    })
}

fn timestamp_field(
    payload: &HashMap<String, qdrant_client::qdrant::Value>,
    field: &str,
) -> DateTime<Utc> {
    let secs = payload.get(field).and_then(|v| v.as_integer()).unwrap_or(0);
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

fn dense_vector_output(vectors: Option<qdrant_client::qdrant::VectorsOutput>) -> Vec<f32> {
    match vectors.and_then(|v| v.vectors_options) {
        Some(qdrant_client::qdrant::vectors_output::VectorsOptions::Vector(v)) => v.data,
        _ => Vec::new(),
    }
}

fn keyword_match(field: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

fn text_match(field: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Text(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

fn any_of(conditions: Vec<Condition>) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Filter(Filter {
            should: conditions,
            ..Default::default()
        })),
    }
}

/// Translate an `AgentFilter` into a Qdrant filter: a conjunction of
/// clauses, each multi-value clause a disjunction of exact matches, the
/// text query a disjunction of full-text matches over name/description.
fn build_filter(filter: &AgentFilter) -> Option<Filter> {
    let mut conditions = Vec::new();

    if !filter.tags.is_empty() {
        conditions.push(any_of(
            filter.tags.iter().map(|t| keyword_match("tags", t)).collect(),
        ));
    }

    if !filter.skills.is_empty() {
        conditions.push(any_of(
            filter
                .skills
                .iter()
                .map(|s| keyword_match("skill_ids", s))
                .collect(),
        ));
    }

    if !filter.query.is_empty() {
        conditions.push(any_of(vec![
            text_match("card_name", &filter.query),
            text_match("card_description", &filter.query),
        ]));
    }

    if conditions.is_empty() {
        return None;
    }

    Some(Filter::must(conditions))
}
