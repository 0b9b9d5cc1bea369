use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;

use crate::presentation::handlers::ErrorBody;

pub const AUTH_SUBJECT_HEADER: &str = "x-auth-subject";
pub const AUTH_NAME_HEADER: &str = "x-auth-name";
pub const AUTH_EMAIL_HEADER: &str = "x-auth-email";

/// Identity of the caller as verified by the external auth provider.
///
/// The auth proxy in front of this service validates the session and
/// forwards the subject (plus optional profile fields) in headers; the
/// subject string is trusted as the user key. Requests without a subject are
/// rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let Some(subject) = header(AUTH_SUBJECT_HEADER) else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error_kind: "unauthenticated",
                    message: "missing verified auth subject".to_string(),
                }),
            ));
        };

        Ok(AuthUser {
            subject,
            full_name: header(AUTH_NAME_HEADER),
            email: header(AUTH_EMAIL_HEADER),
        })
    }
}
