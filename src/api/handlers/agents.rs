use crate::{
    api::extract::Json,
    registry::{CreateInput, ListInput, UpdateInput},
    types::{
        AgentListResponse, AgentRecordResponse, PaginationResponse, RegisterAgentRequest, Result,
        UpdateAgentRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Query parameters accepted by the agent listing endpoint. `tags` and
/// `skills` are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct ListAgentsParams {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    pub tags: Option<String>,
    pub skills: Option<String>,
    pub q: Option<String>,
}

fn split_csv(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Register a new agent
#[utoipa::path(
    post,
    path = "/api/agents",
    request_body = RegisterAgentRequest,
    responses(
        (status = 201, description = "Agent registered", body = AgentRecordResponse),
        (status = 400, description = "Invalid agent id or card"),
        (status = 409, description = "Agent id already taken")
    ),
    tag = "agents"
)]
pub async fn register_agent(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<AgentRecordResponse>)> {
    let agent = state
        .registry
        .create(CreateInput {
            id: payload.agent_id,
            card: payload.agent_card,
            tags: payload.tags,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AgentRecordResponse::from(&agent))))
}

/// Get a registered agent by id
#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent identifier")),
    responses(
        (status = 200, description = "Agent record", body = AgentRecordResponse),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentRecordResponse>> {
    let agent = state.registry.get(&id).await?;
    Ok(Json(AgentRecordResponse::from(&agent)))
}

/// List registered agents
#[utoipa::path(
    get,
    path = "/api/agents",
    responses(
        (status = 200, description = "Page of agent records", body = AgentListResponse)
    ),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<AppState>,
    Query(params): Query<ListAgentsParams>,
) -> Result<Json<AgentListResponse>> {
    let limit = if params.limit == 0 { 20 } else { params.limit };

    let result = state
        .registry
        .list(ListInput {
            offset: params.offset,
            limit,
            tags: split_csv(params.tags),
            skills: split_csv(params.skills),
            query: params.q.unwrap_or_default(),
        })
        .await?;

    let agents: Vec<AgentRecordResponse> =
        result.agents.iter().map(AgentRecordResponse::from).collect();
    let returned = agents.len();

    Ok(Json(AgentListResponse {
        agents,
        pagination: PaginationResponse {
            total: result.total,
            offset: params.offset,
            limit,
            has_more: params.offset + returned < result.total,
        },
    }))
}

/// Update a registered agent
#[utoipa::path(
    put,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent identifier")),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Updated agent record", body = AgentRecordResponse),
        (status = 400, description = "Invalid agent card"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAgentRequest>,
) -> Result<Json<AgentRecordResponse>> {
    let agent = state
        .registry
        .update(UpdateInput {
            id,
            card: payload.agent_card,
            tags: payload.tags,
        })
        .await?;

    Ok(Json(AgentRecordResponse::from(&agent)))
}

/// Remove a registered agent
#[utoipa::path(
    delete,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent identifier")),
    responses(
        (status = 204, description = "Agent removed"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.registry.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv() {
        assert_eq!(
            split_csv(Some("prod,i18n".to_string())),
            vec!["prod".to_string(), "i18n".to_string()]
        );
        assert_eq!(
            split_csv(Some(" prod , ,i18n ".to_string())),
            vec!["prod".to_string(), "i18n".to_string()]
        );
        assert!(split_csv(Some(String::new())).is_empty());
        assert!(split_csv(None).is_empty());
    }
}
