use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Favourite {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A validated `(user_id, product_id)` pair ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewFavourite {
    pub user_id: i64,
    pub product_id: i64,
}
