//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use crate::auth::token::DEFAULT_TOKEN_TTL_HOURS;
use crate::domain::{TransferPolicy, DEFAULT_STARTING_BALANCE};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub market: MarketSettings,
}

/// Settings handed to the handlers and the token service
#[derive(Debug, Clone)]
pub struct MarketSettings {
    /// Credential signing secret
    pub jwt_secret: String,

    /// Credential lifetime in hours
    pub token_ttl_hours: i64,

    /// Balance of a freshly registered user
    pub starting_balance: i64,

    pub transfer_policy: TransferPolicy,
}

impl MarketSettings {
    /// Settings with default values and the given secret
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            starting_balance: DEFAULT_STARTING_BALANCE,
            transfer_policy: TransferPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingEnv("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET"));
        }

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_HOURS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_HOURS"))?;

        let starting_balance: i64 = env::var("STARTING_BALANCE")
            .unwrap_or_else(|_| DEFAULT_STARTING_BALANCE.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STARTING_BALANCE"))?;
        if starting_balance < 0 {
            return Err(ConfigError::InvalidValue("STARTING_BALANCE"));
        }

        let defaults = TransferPolicy::default();
        let transfer_policy = TransferPolicy {
            allow_self_transfer: bool_var("ALLOW_SELF_TRANSFER", defaults.allow_self_transfer)?,
            allow_zero_amount: bool_var("ALLOW_ZERO_AMOUNT", defaults.allow_zero_amount)?,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            market: MarketSettings {
                jwt_secret,
                token_ttl_hours,
                starting_balance,
                transfer_policy,
            },
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" ON "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_market_settings_defaults() {
        let settings = MarketSettings::with_secret("secret");
        assert_eq!(settings.token_ttl_hours, 72);
        assert_eq!(settings.starting_balance, 1000);
        assert!(settings.transfer_policy.allow_self_transfer);
        assert!(!settings.transfer_policy.allow_zero_amount);
    }
}
