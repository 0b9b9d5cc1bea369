use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Episode, Recommendations};
use crate::presentation::auth::AuthUser;
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResponse {
    pub unique_id: String,
    pub title: String,
    pub pub_date: DateTime<Utc>,
    pub link: String,
    pub audio_url: Option<String>,
    pub feed_url: String,
    pub description: String,
    pub image: Option<String>,
    pub recommendations: Option<Recommendations>,
}

impl From<Episode> for EpisodeResponse {
    fn from(e: Episode) -> Self {
        Self {
            unique_id: e.unique_id,
            title: e.title,
            pub_date: e.pub_date,
            link: e.link,
            audio_url: e.audio_url,
            feed_url: e.feed_url,
            description: e.description,
            image: e.image,
            recommendations: e.recommendations,
        }
    }
}

#[derive(Deserialize)]
pub struct RawEpisodesQuery {
    #[serde(rename = "feedUrl")]
    pub feed_url: Option<String>,
}

/// `GET /api/podcasts/raw?feedUrl=` — normalized episode list straight from
/// the feed, nothing persisted.
#[tracing::instrument(skip(state, query))]
pub async fn raw_episodes_handler(
    State(state): State<AppState>,
    Query(query): Query<RawEpisodesQuery>,
) -> Response {
    let Some(feed_url) = query.feed_url.filter(|u| !u.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "bad-request", "missing feed URL");
    };

    match state.feed_ingestion.fetch(&feed_url).await {
        Ok(episodes) => {
            let body: Vec<EpisodeResponse> =
                episodes.into_iter().map(EpisodeResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, feed_url, "Feed fetch failed");
            error_response(StatusCode::BAD_GATEWAY, "upstream-failure", e.to_string())
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEpisodeRequest {
    pub unique_id: Option<String>,
    pub title: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub link: Option<String>,
    pub audio_url: Option<String>,
    pub feed_url: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// `POST /api/podcasts/single` — upserts one episode by its unique id.
#[tracing::instrument(skip(state, _auth, request))]
pub async fn save_episode_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<SaveEpisodeRequest>,
) -> Response {
    let Some(unique_id) = request.unique_id.filter(|id| !id.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "bad-request",
            "missing episode uniqueId",
        );
    };

    let mut episode = Episode::new(
        unique_id,
        request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled Episode".to_string()),
        request.pub_date.unwrap_or_else(Utc::now),
        request.link.unwrap_or_default(),
        request.audio_url.filter(|u| !u.is_empty()),
        request.feed_url.unwrap_or_default(),
    );
    episode.description = request.description.unwrap_or_default();
    episode.image = request.image;

    match state.episodes.upsert(&episode).await {
        Ok(saved) => (StatusCode::OK, Json(EpisodeResponse::from(saved))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save episode");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "failed to save episode",
            )
        }
    }
}
