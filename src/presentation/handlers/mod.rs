mod episodes;
mod health;
mod recommendations;
mod users;

pub use episodes::{raw_episodes_handler, save_episode_handler};
pub use health::health_handler;
pub use recommendations::episode_recommendations_handler;
pub use users::{get_recent_feeds_handler, save_recent_feeds_handler, save_user_handler};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::services::RecommendationError;

/// Structured error returned to clients: a machine-readable kind and a
/// human-readable message. Raw upstream error bodies are never exposed.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error_kind: &'static str,
    pub message: String,
}

pub fn error_response(
    status: StatusCode,
    error_kind: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(ErrorBody {
            error_kind,
            message: message.into(),
        }),
    )
        .into_response()
}

/// Maps orchestrator failures onto the stable HTTP error surface.
pub fn recommendation_error_response(err: RecommendationError) -> Response {
    match err {
        RecommendationError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "not-found", err.to_string())
        }
        RecommendationError::NoAudio => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "no-audio", err.to_string())
        }
        RecommendationError::QuotaExceeded => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "quota-exceeded",
            err.to_string(),
        ),
        RecommendationError::TimedOut => {
            error_response(StatusCode::BAD_GATEWAY, "timed-out", err.to_string())
        }
        RecommendationError::Upstream(_) | RecommendationError::Validation(_) => {
            error_response(StatusCode::BAD_GATEWAY, "upstream-failure", err.to_string())
        }
        RecommendationError::Store(e) => {
            tracing::error!(error = %e, "Store failure during recommendation request");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "store failure",
            )
        }
    }
}
