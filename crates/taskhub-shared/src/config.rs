//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::warn;

use crate::constants::{DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_SESSION_TTL_LONG, DEFAULT_SESSION_TTL_SHORT};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub jwt: JwtSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub allowed_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    /// Access token lifetime in seconds (short: minutes).
    pub access_token_expiry: i64,
}

/// TTL classes for the server-side session record and the refresh/session-id
/// cookies. `remember_me` selects `ttl_long`, otherwise `ttl_short`.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_short: i64,
    pub ttl_long: i64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 3000)?
            .set_default("app.name", "taskhub-server")?
            .set_default("app.allowed_origin", "http://localhost:5173")?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("session.ttl_short", DEFAULT_SESSION_TTL_SHORT)?
            .set_default("session.ttl_long", DEFAULT_SESSION_TTL_LONG)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    /// Startup sanity checks. A missing or placeholder JWT secret is a
    /// misconfiguration, never silently defaulted in production.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret_weak = self.jwt.secret.is_empty() || self.jwt.secret.len() < 32;
        if secret_weak {
            if self.is_production() {
                return Err(ConfigError::Message(
                    "jwt.secret must be set to a strong value (>= 32 bytes) in production".into(),
                ));
            }
            warn!("jwt.secret is weak or unset; acceptable only in development");
        }
        if self.session.ttl_long <= self.session.ttl_short {
            return Err(ConfigError::Message(
                "session.ttl_long must be strictly greater than session.ttl_short".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(env: &str, secret: &str) -> AppConfig {
        AppConfig {
            app: AppSettings {
                env: env.to_string(),
                host: "127.0.0.1".to_string(),
                port: 3000,
                name: "taskhub-server".to_string(),
                allowed_origin: "http://localhost:5173".to_string(),
            },
            database: DatabaseSettings {
                url: "postgres://localhost/taskhub".to_string(),
                max_connections: 5,
            },
            redis: RedisSettings {
                url: "redis://127.0.0.1:6379".to_string(),
            },
            jwt: JwtSettings {
                secret: secret.to_string(),
                access_token_expiry: 300,
            },
            session: SessionSettings {
                ttl_short: 14_400,
                ttl_long: 2_592_000,
            },
        }
    }

    #[test]
    fn weak_secret_rejected_in_production() {
        let config = base_config("production", "short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn weak_secret_tolerated_in_development() {
        let config = base_config("development", "dev-secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_ttl_classes_rejected() {
        let mut config = base_config("development", "dev-secret");
        config.session.ttl_long = config.session.ttl_short;
        assert!(config.validate().is_err());
    }
}
