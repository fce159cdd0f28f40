use crate::{
    api::extract::Json,
    registry::DiscoverInput,
    types::{
        AgentRecordResponse, DiscoverRequest, DiscoverResponse, Result, ScoredAgentResponse,
    },
    AppState,
};
use axum::extract::State;

/// Discover agents by semantic similarity
#[utoipa::path(
    post,
    path = "/api/discover",
    request_body = DiscoverRequest,
    responses(
        (status = 200, description = "Ranked matching agents", body = DiscoverResponse),
        (status = 502, description = "Embedding service failure"),
        (status = 503, description = "No embedder configured")
    ),
    tag = "discovery"
)]
pub async fn discover(
    State(state): State<AppState>,
    Json(payload): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>> {
    let results = state
        .registry
        .discover(DiscoverInput {
            query: payload.query,
            limit: payload.limit.unwrap_or(0),
            tags: payload.tags,
            skills: payload.skills,
        })
        .await?;

    let agents = results
        .iter()
        .map(|scored| ScoredAgentResponse {
            agent: AgentRecordResponse::from(&scored.agent),
            score: scored.score,
        })
        .collect();

    Ok(Json(DiscoverResponse { agents }))
}
