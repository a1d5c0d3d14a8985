use tracing::{error, info, warn};

use super::{
    dto::FavouriteParams,
    error::FavouriteError,
    repo::{FavouriteStore, StoreError},
    repo_types::Favourite,
};
use crate::auth::identity::Identity;

/// Converts a store error, logging unexpected database failures under `operation`.
fn store_error(operation: &'static str) -> impl Fn(StoreError) -> FavouriteError {
    move |e| {
        if let StoreError::Database(db) = &e {
            error!(operation, error = %db, "favourite store failure");
        }
        e.into()
    }
}

pub async fn list(
    store: &dyn FavouriteStore,
    caller: &Identity,
) -> Result<Vec<Favourite>, FavouriteError> {
    store
        .list_by_user(caller.id)
        .await
        .map_err(store_error("list"))
}

/// Create a favourite for the caller. A `user_id` naming someone else is
/// rejected before validation, so nothing is written.
pub async fn create(
    store: &dyn FavouriteStore,
    caller: &Identity,
    params: FavouriteParams,
) -> Result<Favourite, FavouriteError> {
    if params.user_id.id().is_some_and(|id| id != caller.id) {
        warn!(
            caller_id = caller.id,
            requested_user_id = ?params.user_id,
            "create favourite for another user rejected"
        );
        return Err(FavouriteError::Unauthorized);
    }

    let new = params.validate()?;
    let favourite = store.insert(new).await.map_err(store_error("create"))?;
    info!(
        favourite_id = favourite.id,
        user_id = favourite.user_id,
        email = %caller.email,
        product_id = favourite.product_id,
        "favourite created"
    );
    Ok(favourite)
}

/// Replace the references of a favourite owned by the caller. Ownership is
/// settled before the payload is looked at.
pub async fn update(
    store: &dyn FavouriteStore,
    caller: &Identity,
    id: i64,
    params: FavouriteParams,
) -> Result<Favourite, FavouriteError> {
    let existing = store
        .find(id)
        .await
        .map_err(store_error("update"))?
        .ok_or(FavouriteError::NotFound)?;
    if existing.user_id != caller.id {
        warn!(
            caller_id = caller.id,
            owner_id = existing.user_id,
            favourite_id = id,
            "update of foreign favourite rejected"
        );
        return Err(FavouriteError::Unauthorized);
    }

    let new = params.validate()?;
    let favourite = store
        .update(id, new)
        .await
        .map_err(store_error("update"))?;
    info!(
        favourite_id = favourite.id,
        user_id = favourite.user_id,
        product_id = favourite.product_id,
        "favourite updated"
    );
    Ok(favourite)
}

/// Delete a favourite owned by the caller. Foreign and missing rows are
/// both reported as `NotFound`.
pub async fn delete(
    store: &dyn FavouriteStore,
    caller: &Identity,
    id: i64,
) -> Result<(), FavouriteError> {
    let deleted = store
        .delete_owned(id, caller.id)
        .await
        .map_err(store_error("delete"))?;
    if !deleted {
        return Err(FavouriteError::NotFound);
    }
    info!(favourite_id = id, user_id = caller.id, "favourite deleted");
    Ok(())
}
