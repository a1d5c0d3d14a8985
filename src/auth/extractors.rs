use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use super::identity::Identity;
use crate::state::AppState;

pub const USER_TOKEN_HEADER: &str = "x-user-token";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Authenticates the request from `X-User-Token` / `X-User-Email`.
pub struct CurrentUser(pub Identity);

/// Rejection for unauthenticated requests: a 302 to the failure path.
#[derive(Debug)]
pub struct AuthRedirect(pub String);

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let redirect = || AuthRedirect(state.config.auth_failure_path.clone());

        let (Some(email), Some(token)) = (
            header_value(parts, USER_EMAIL_HEADER),
            header_value(parts, USER_TOKEN_HEADER),
        ) else {
            warn!("missing authentication headers");
            return Err(redirect());
        };

        match state.identity.authenticate(&email, &token).await {
            Ok(Some(identity)) => Ok(CurrentUser(identity)),
            Ok(None) => {
                warn!(%email, "invalid authentication token");
                Err(redirect())
            }
            Err(e) => {
                error!(error = %e, "identity lookup failed");
                Err(redirect())
            }
        }
    }
}
