use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::repo_types::{Favourite, NewFavourite};

const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced user or product does not exist.
    #[error("{0}")]
    ForeignKey(String),

    #[error("row not found")]
    NotFound,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return StoreError::ForeignKey(foreign_key_message(db.constraint()));
            }
        }
        StoreError::Database(e)
    }
}

fn foreign_key_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("product_id") => "product must exist".into(),
        Some(c) if c.contains("user_id") => "user must exist".into(),
        _ => "referenced record must exist".into(),
    }
}

/// Durable storage for favourites.
#[async_trait]
pub trait FavouriteStore: Send + Sync {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Favourite>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<Favourite>, StoreError>;

    async fn insert(&self, new: NewFavourite) -> Result<Favourite, StoreError>;

    /// Overwrite both references. `StoreError::NotFound` if the row is gone.
    async fn update(&self, id: i64, new: NewFavourite) -> Result<Favourite, StoreError>;

    /// Delete `id` only if it belongs to `user_id`. Returns whether a row went away.
    async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgFavouriteStore {
    db: PgPool,
}

impl PgFavouriteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavouriteStore for PgFavouriteStore {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Favourite>, StoreError> {
        let rows = sqlx::query_as::<_, Favourite>(
            r#"
            SELECT id, user_id, product_id, created_at, updated_at
            FROM favourites
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Favourite>, StoreError> {
        let row = sqlx::query_as::<_, Favourite>(
            r#"
            SELECT id, user_id, product_id, created_at, updated_at
            FROM favourites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, new: NewFavourite) -> Result<Favourite, StoreError> {
        let row = sqlx::query_as::<_, Favourite>(
            r#"
            INSERT INTO favourites (user_id, product_id)
            VALUES ($1, $2)
            RETURNING id, user_id, product_id, created_at, updated_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.product_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, new: NewFavourite) -> Result<Favourite, StoreError> {
        sqlx::query_as::<_, Favourite>(
            r#"
            UPDATE favourites
               SET user_id = $2, product_id = $3, updated_at = now()
             WHERE id = $1
            RETURNING id, user_id, product_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(new.user_id)
        .bind(new.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM favourites WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_messages_name_the_reference() {
        assert_eq!(
            foreign_key_message(Some("favourites_product_id_fkey")),
            "product must exist"
        );
        assert_eq!(
            foreign_key_message(Some("favourites_user_id_fkey")),
            "user must exist"
        );
        assert_eq!(foreign_key_message(None), "referenced record must exist");
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
