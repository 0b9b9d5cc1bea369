use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{normalize_recent_feeds, RecentFeed};
use crate::presentation::auth::AuthUser;
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub subject: String,
    pub full_name: String,
    pub email: String,
    pub recent_feeds: Vec<RecentFeed>,
}

/// `POST /api/save-user` — creates or updates the caller's profile. Profile
/// fields come from the body, falling back to what the auth proxy forwarded.
#[tracing::instrument(skip(state, auth, request), fields(subject = %auth.subject))]
pub async fn save_user_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SaveUserRequest>,
) -> Response {
    let full_name = request
        .full_name
        .or(auth.full_name)
        .filter(|v| !v.trim().is_empty());
    let email = request.email.or(auth.email).filter(|v| !v.trim().is_empty());

    let (Some(full_name), Some(email)) = (full_name, email) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "bad-request",
            "missing required fields: fullName, email",
        );
    };

    match state
        .users
        .upsert_profile(&auth.subject, &full_name, &email.to_lowercase())
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(UserResponse {
                subject: user.subject,
                full_name: user.full_name,
                email: user.email,
                recent_feeds: user.recent_feeds,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save user");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "failed to save user",
            )
        }
    }
}

/// `GET /api/user/recent-feeds` — the caller's recently viewed feeds,
/// most-recent-first.
#[tracing::instrument(skip(state, auth), fields(subject = %auth.subject))]
pub async fn get_recent_feeds_handler(State(state): State<AppState>, auth: AuthUser) -> Response {
    match state.users.find_by_subject(&auth.subject).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user.recent_feeds)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not-found", "user not found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch recent feeds");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "failed to fetch recent feeds",
            )
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecentFeedsRequest {
    #[serde(default)]
    pub recent_feeds: Vec<RecentFeed>,
}

/// `POST /api/user/recent-feeds` — replaces the caller's list, deduplicated
/// by feed URL and capped, creating the user record lazily.
#[tracing::instrument(skip(state, auth, request), fields(subject = %auth.subject))]
pub async fn save_recent_feeds_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SaveRecentFeedsRequest>,
) -> Response {
    let feeds = normalize_recent_feeds(request.recent_feeds, state.settings.recent_feeds_cap);

    let result = async {
        state.users.ensure_exists(&auth.subject).await?;
        state.users.set_recent_feeds(&auth.subject, &feeds).await
    }
    .await;

    match result {
        Ok(()) => (StatusCode::OK, Json(feeds)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save recent feeds");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "failed to save recent feeds",
            )
        }
    }
}
