//! Process configuration loaded once from environment variables.

use std::env;
use std::time::Duration;

use crate::config::db::{db_kind_from_env, DbKind, RuntimeEnv};
use crate::error::AppError;
use crate::state::security_config::{SecurityConfig, DEFAULT_TOKEN_TTL};

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub runtime_env: RuntimeEnv,
    pub db_kind: DbKind,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Request body limit for JSON extractors
    pub max_json_payload_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port_str = env::var("BACKEND_PORT").unwrap_or_else(|_| "3001".to_string());
        let port = port_str.parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_str}'"
            ))
        })?;

        let jwt_secret = match env::var("BACKEND_JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_JWT_SECRET_LEN => secret,
            Ok(_) => {
                return Err(AppError::config(format!(
                    "BACKEND_JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters"
                )))
            }
            Err(_) => return Err(AppError::config("BACKEND_JWT_SECRET must be set")),
        };

        let token_ttl = match env::var("BACKEND_TOKEN_TTL_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    AppError::config(format!(
                        "BACKEND_TOKEN_TTL_SECS must be a positive integer, got '{raw}'"
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::config("BACKEND_TOKEN_TTL_SECS must be positive"));
                }
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_TOKEN_TTL,
        };

        let db_kind = db_kind_from_env("BAZAAR_DB_KIND", DbKind::Postgres)?;

        let max_json_payload_size = env::var("MAX_JSON_PAYLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(256 * 1024);

        Ok(Config {
            host,
            port,
            runtime_env: RuntimeEnv::Prod,
            db_kind,
            jwt_secret,
            token_ttl,
            max_json_payload_size,
        })
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig::new(self.jwt_secret.as_bytes()).with_token_ttl(self.token_ttl)
    }
}
