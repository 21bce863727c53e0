use serde::Deserialize;

/// Fallback used when JWT_SECRET is unset. Startup logs a warning when it
/// is in effect; a real deployment must provide its own secret.
pub const INSECURE_DEFAULT_SECRET: &str = "staffdesk-dev-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Reads configuration from the environment exactly once; everything
    /// downstream receives the constructed value.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://database.sqlite".into());

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure default secret");
                INSECURE_DEFAULT_SECRET.into()
            }
        };

        let jwt = JwtConfig { secret };

        Ok(Self { database_url, jwt })
    }
}
