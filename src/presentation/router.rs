use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    episode_recommendations_handler, get_recent_feeds_handler, health_handler,
    raw_episodes_handler, save_episode_handler, save_recent_feeds_handler, save_user_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/podcasts/raw", get(raw_episodes_handler))
        .route("/api/podcasts/single", post(save_episode_handler))
        .route(
            "/api/episodes/{unique_id}/recommendations",
            get(episode_recommendations_handler),
        )
        .route("/api/save-user", post(save_user_handler))
        .route(
            "/api/user/recent-feeds",
            get(get_recent_feeds_handler).post(save_recent_feeds_handler),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
