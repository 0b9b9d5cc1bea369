use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::Recommendations;
use crate::presentation::auth::AuthUser;
use crate::presentation::state::AppState;

use super::recommendation_error_response;

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Recommendations,
}

/// `GET /api/episodes/{unique_id}/recommendations` — returns the cached
/// payload or runs the recommendation pipeline for one episode.
#[tracing::instrument(skip(state, auth), fields(subject = %auth.subject))]
pub async fn episode_recommendations_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(unique_id): Path<String>,
) -> Response {
    match state
        .recommendations
        .recommendations_for(&auth.subject, &unique_id)
        .await
    {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(RecommendationsResponse { recommendations }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, unique_id, "Recommendation request failed");
            recommendation_error_response(e)
        }
    }
}
