use super::{
    handlers::{health, votes},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Posts
        .route("/api/v1/posts/{id}", get(votes::get_post))
        .route(
            "/api/v1/posts/{id}/vote",
            post(votes::cast_post_vote).delete(votes::retract_post_vote),
        )
        // Comments
        .route("/api/v1/comments/{id}", get(votes::get_comment))
        .route(
            "/api/v1/comments/{id}/vote",
            post(votes::cast_comment_vote).delete(votes::retract_comment_vote),
        )
        // Batch lookup for listings
        .route("/api/v1/votes/lookup", post(votes::lookup_votes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
