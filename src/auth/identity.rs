use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::services::{normalize_email, tokens_match};

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
}

/// Resolves a `(email, token)` credential pair to a user.
///
/// `Ok(None)` means the credentials were well-formed but do not match
/// any user; `Err` is reserved for backend failures.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, token: &str) -> anyhow::Result<Option<Identity>>;
}

#[derive(Clone)]
pub struct PgIdentityProvider {
    db: PgPool,
}

impl PgIdentityProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn authenticate(&self, email: &str, token: &str) -> anyhow::Result<Option<Identity>> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, email, authentication_token
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;

        let identity = row
            .filter(|(_, _, stored)| tokens_match(stored, token))
            .map(|(id, email, _)| Identity { id, email });
        if identity.is_none() {
            debug!(email, "token authentication failed");
        }
        Ok(identity)
    }
}
