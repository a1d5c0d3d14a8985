use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::repo_types::Product;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, (StatusCode, String)> {
    state.products.list().await.map(Json).map_err(|e| {
        error!(error = %e, "list products failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, (StatusCode, String)> {
    match state.products.find(id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Product not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get product failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
