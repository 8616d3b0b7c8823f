//! Configuration module
//!
//! Environment-driven configuration for the API service, the database pool,
//! and the external encoding worker. `Config::from_env` reads everything up
//! front; `validate` rejects configurations that cannot work.

use std::env;

use crate::models::{DEFAULT_JOB_PRIORITY, MAX_TRANSCODE_ATTEMPTS};

const DB_MAX_CONNECTIONS: u32 = 20;
const DB_TIMEOUT_SECS: u64 = 30;
const ENCODER_SUBMIT_TIMEOUT_SECS: u64 = 30;
const MIN_WEBHOOK_SECRET_LEN: usize = 16;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Bearer token for service-to-service calls. `None` disables auth
    /// (local development only).
    pub service_api_key: Option<String>,
    /// Base URL of the external encoding worker.
    pub encoder_base_url: String,
    pub encoder_api_key: Option<String>,
    /// Timeout for the job submission call only; transcoding itself completes
    /// out-of-band via callback.
    pub encoder_submit_timeout_secs: u64,
    /// Publicly reachable base URL of this service, used to build the
    /// callback URL handed to the worker.
    pub callback_base_url: String,
    /// Shared secret the worker uses to sign completion callbacks.
    pub webhook_secret: String,
    pub max_transcode_attempts: i32,
    pub default_job_priority: i32,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} must be set", key))
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = Config {
            server_port: env_parsed("SERVER_PORT", 8080),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env_required("DATABASE_URL")?,
            db_max_connections: env_parsed("DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parsed("DB_TIMEOUT_SECONDS", DB_TIMEOUT_SECS),
            service_api_key: env::var("SERVICE_API_KEY").ok().filter(|v| !v.is_empty()),
            encoder_base_url: env_required("ENCODER_BASE_URL")?,
            encoder_api_key: env::var("ENCODER_API_KEY").ok().filter(|v| !v.is_empty()),
            encoder_submit_timeout_secs: env_parsed(
                "ENCODER_SUBMIT_TIMEOUT_SECS",
                ENCODER_SUBMIT_TIMEOUT_SECS,
            ),
            callback_base_url: env_required("CALLBACK_BASE_URL")?,
            webhook_secret: env_required("TRANSCODE_WEBHOOK_SECRET")?,
            max_transcode_attempts: env_parsed("MAX_TRANSCODE_ATTEMPTS", MAX_TRANSCODE_ATTEMPTS),
            default_job_priority: env_parsed("DEFAULT_JOB_PRIORITY", DEFAULT_JOB_PRIORITY),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server_port == 0 {
            anyhow::bail!("SERVER_PORT must be non-zero");
        }
        if !self.encoder_base_url.starts_with("http://")
            && !self.encoder_base_url.starts_with("https://")
        {
            anyhow::bail!("ENCODER_BASE_URL must be an http(s) URL");
        }
        if !self.callback_base_url.starts_with("http://")
            && !self.callback_base_url.starts_with("https://")
        {
            anyhow::bail!("CALLBACK_BASE_URL must be an http(s) URL");
        }
        if self.webhook_secret.len() < MIN_WEBHOOK_SECRET_LEN {
            anyhow::bail!(
                "TRANSCODE_WEBHOOK_SECRET must be at least {} characters",
                MIN_WEBHOOK_SECRET_LEN
            );
        }
        if self.max_transcode_attempts < 1 {
            anyhow::bail!("MAX_TRANSCODE_ATTEMPTS must be at least 1");
        }
        if self.is_production() && self.service_api_key.is_none() {
            anyhow::bail!("SERVICE_API_KEY must be set in production");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Callback URL handed to the encoding worker at submission time.
    pub fn transcode_callback_url(&self) -> String {
        format!(
            "{}/api/v0/webhooks/transcoding",
            self.callback_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server_port: 8080,
            cors_origins: vec![],
            environment: "development".to_string(),
            database_url: "postgres://localhost/offstage".to_string(),
            db_max_connections: 20,
            db_timeout_seconds: 30,
            service_api_key: None,
            encoder_base_url: "https://encoder.example.com".to_string(),
            encoder_api_key: None,
            encoder_submit_timeout_secs: 30,
            callback_base_url: "https://api.example.com/".to_string(),
            webhook_secret: "0123456789abcdef".to_string(),
            max_transcode_attempts: 3,
            default_job_priority: 100,
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_callback_url_strips_trailing_slash() {
        let config = valid_config();
        assert_eq!(
            config.transcode_callback_url(),
            "https://api.example.com/api/v0/webhooks/transcoding"
        );
    }

    #[test]
    fn test_short_webhook_secret_rejected() {
        let mut config = valid_config();
        config.webhook_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_encoder_url_rejected() {
        let mut config = valid_config();
        config.encoder_base_url = "ftp://encoder".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_service_api_key() {
        let mut config = valid_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());
        config.service_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
        assert!(config.is_production());
    }
}
