use crate::error::{Result, TrustSafetyError};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODERATION_MODEL: &str = "omni-moderation-latest";

/// Deployment environment.
///
/// Anything that is not recognisably development is treated as production so
/// moderation fails closed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub moderation: ModerationConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub service_name: String,
    pub host: String,
    pub port: u16,
    pub log_format: String,
}

#[derive(Clone)]
pub struct ModerationConfig {
    /// Absent means no external classifier
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for ModerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModerationConfig")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AdminConfig {
    pub api_key: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// Same helpers as db_pool::env_utils; this service has no database so it
// does not link the pool crate.
fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    non_empty_env(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Environment::parse(
            &non_empty_env("APP_ENV")
                .or_else(|| non_empty_env("ENVIRONMENT"))
                .unwrap_or_else(|| "development".to_string()),
        );

        let admin_api_key = non_empty_env("ADMIN_API_KEY");
        if admin_api_key.is_none() && !environment.is_development() {
            return Err(TrustSafetyError::Config(format!(
                "ADMIN_API_KEY must be set in {}",
                environment
            )));
        }

        Ok(Self {
            app: AppConfig {
                environment,
                service_name: non_empty_env("SERVICE_NAME")
                    .unwrap_or_else(|| "trust-safety-service".to_string()),
                host: non_empty_env("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_env_with_default("PORT", 8086),
                log_format: non_empty_env("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            },
            moderation: ModerationConfig {
                openai_api_key: non_empty_env("OPENAI_API_KEY"),
                openai_base_url: non_empty_env("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: non_empty_env("MODERATION_MODEL")
                    .unwrap_or_else(|| DEFAULT_MODERATION_MODEL.to_string()),
                timeout_secs: parse_env_with_default("MODERATION_TIMEOUT_SECS", 10),
            },
            admin: AdminConfig {
                api_key: admin_api_key,
            },
        })
    }
}
