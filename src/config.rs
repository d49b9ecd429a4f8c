use dotenv::dotenv;
use std::env;

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_secret: String,
    pub serpapi_key: String,
}

impl Config {
    /// Secrets are never compiled in: the session-signing key and the
    /// SerpAPI key must arrive through the environment.
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv().ok();
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://users.db?mode=rwc".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            session_secret: env::var("SESSION_SECRET")?,
            serpapi_key: env::var("SERPAPI_KEY")?,
        })
    }
}
