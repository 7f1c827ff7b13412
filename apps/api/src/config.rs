use anyhow::{Context, Result};

const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Resume extraction is disabled when no key is configured.
    pub openai_api_key: Option<String>,
    pub ai_endpoint: String,
    pub ai_model: String,
    pub bcrypt_cost: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let database_url = require_env("DATABASE_URL")
            .or_else(|_| require_env("POSTGRES_URL"))
            .context("Either DATABASE_URL or POSTGRES_URL must be set")?;

        Ok(Config {
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_env("JWT_SECRET")?,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            ai_endpoint: optional_env("AI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string()),
            ai_model: optional_env("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            bcrypt_cost: parse_env("BCRYPT_COST", 10)?,
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
