use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/agents",
            get(crate::api::handlers::agents::list_agents)
                .post(crate::api::handlers::agents::register_agent),
        )
        .route(
            "/agents/{id}",
            get(crate::api::handlers::agents::get_agent)
                .put(crate::api::handlers::agents::update_agent)
                .delete(crate::api::handlers::agents::delete_agent),
        )
        .route("/discover", post(crate::api::handlers::discovery::discover))
}
