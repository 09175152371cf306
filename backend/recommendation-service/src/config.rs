/// Configuration management for the recommendation service
///
/// Values come from environment variables (optionally seeded from `.env`).
use db_pool::env_utils::{non_empty_env, parse_env_with_default};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub service_name: String,
    pub host: String,
    pub port: u16,
    /// `json` switches the log formatter to structured JSON lines
    pub log_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let env = non_empty_env("APP_ENV")
            .or_else(|| non_empty_env("ENVIRONMENT"))
            .unwrap_or_else(|| "development".to_string());

        let database_url = match non_empty_env("DATABASE_URL") {
            Some(url) => url,
            None if env.eq_ignore_ascii_case("production") => {
                return Err("DATABASE_URL must be set in production".to_string())
            }
            None => "postgres://localhost/wimi".to_string(),
        };

        Ok(Config {
            app: AppConfig {
                env,
                service_name: non_empty_env("SERVICE_NAME")
                    .unwrap_or_else(|| "recommendation-service".to_string()),
                host: non_empty_env("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_env_with_default("PORT", 8090),
                log_format: non_empty_env("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", 10),
                run_migrations: parse_env_with_default("RUN_MIGRATIONS", true),
            },
        })
    }
}
