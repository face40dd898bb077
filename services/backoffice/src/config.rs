/// Back-office service configuration loaded from environment variables.
#[derive(Debug)]
pub struct BackofficeConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3117). Env var: `BACKOFFICE_PORT`.
    pub port: u16,
}

impl BackofficeConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            port: std::env::var("BACKOFFICE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3117),
        }
    }
}
