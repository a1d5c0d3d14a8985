use serde::Deserialize;

pub const DEFAULT_AUTH_FAILURE_PATH: &str = "/api/v1/authentication_failure";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Where unauthenticated requests are redirected.
    pub auth_failure_path: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth_failure_path = std::env::var("AUTH_FAILURE_PATH")
            .unwrap_or_else(|_| DEFAULT_AUTH_FAILURE_PATH.into());
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        Ok(Self {
            database_url,
            auth_failure_path,
            db_max_connections,
        })
    }
}
