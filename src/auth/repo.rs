use crate::auth::repo_types::User;
use sqlx::PgPool;

const UNIQUE_VIOLATION: &str = "23505";

/// True when `err` is a PostgreSQL unique constraint violation, e.g. two
/// registrations racing for the same email.
pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| match e {
            sqlx::Error::Database(db) => db.code().map(|c| c == UNIQUE_VIOLATION),
            _ => None,
        })
        .unwrap_or(false)
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, authentication_token, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, authentication_token, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password and a fresh authentication token.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        authentication_token: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, authentication_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, authentication_token, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(authentication_token)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Delete a user. Their favourites go with them (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&anyhow::anyhow!("23505")));
        assert!(!is_unique_violation(&anyhow::Error::from(sqlx::Error::RowNotFound)));
        assert!(!is_unique_violation(&anyhow::Error::from(sqlx::Error::PoolTimedOut)));
    }
}
