use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::repo::StoreError;

/// Outcomes of a favourite operation other than success.
///
/// Unauthenticated callers never get this far: the `CurrentUser`
/// extractor redirects them before a handler runs.
#[derive(Debug, Error)]
pub enum FavouriteError {
    #[error("not authorized to modify this favourite")]
    Unauthorized,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("favourite not found")]
    NotFound,

    #[error("favourite store failure")]
    Store(#[source] StoreError),
}

impl From<StoreError> for FavouriteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ForeignKey(msg) => FavouriteError::ValidationFailed(msg),
            StoreError::NotFound => FavouriteError::NotFound,
            e @ StoreError::Database(_) => FavouriteError::Store(e),
        }
    }
}

impl FavouriteError {
    pub fn status(&self) -> StatusCode {
        match self {
            FavouriteError::Unauthorized => StatusCode::UNAUTHORIZED,
            FavouriteError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FavouriteError::NotFound => StatusCode::NOT_FOUND,
            FavouriteError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FavouriteError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
