use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{
    dto::{FavouriteParams, FavouriteRequest, FavouriteView},
    error::FavouriteError,
    services,
};
use crate::{auth::extractors::CurrentUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favourites", get(list_favourites))
        .route("/favourites/create", post(create_favourite))
        .route("/favourites/update/:id", patch(update_favourite))
        .route("/favourites/delete/:id", delete(delete_favourite))
}

/// A body that is not JSON, or not shaped like a favourite, is not rejected
/// here: it becomes invalid params so authorization still runs first.
fn read_params(payload: Result<Json<FavouriteRequest>, JsonRejection>) -> FavouriteParams {
    match payload {
        Ok(Json(body)) => body.favourite,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "unreadable favourite payload");
            FavouriteParams::unreadable()
        }
    }
}

#[instrument(skip(state))]
pub async fn list_favourites(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<FavouriteView>>, FavouriteError> {
    let rows = services::list(state.favourites.as_ref(), &caller).await?;
    Ok(Json(rows.into_iter().map(FavouriteView::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_favourite(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    payload: Result<Json<FavouriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FavouriteView>), FavouriteError> {
    let params = read_params(payload);
    let created = services::create(state.favourites.as_ref(), &caller, params).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_favourite(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    payload: Result<Json<FavouriteRequest>, JsonRejection>,
) -> Result<Json<FavouriteView>, FavouriteError> {
    let params = read_params(payload);
    let updated = services::update(state.favourites.as_ref(), &caller, id, params).await?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_favourite(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, FavouriteError> {
    services::delete(state.favourites.as_ref(), &caller, id).await?;
    Ok(Json(json!({})))
}
