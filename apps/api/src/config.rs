// Application configuration
// Read once at startup from the environment (and an optional .env file)

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const DEFAULT_APP_NAME: &str = "Keystone API";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_TOKEN_DAYS: i64 = 30;
pub const MAX_TOKEN_DAYS: i64 = 36_500;
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("JWT_ALGORITHM must be one of HS256, HS384, HS512 (got {0:?})")]
    UnsupportedAlgorithm(String),

    #[error("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    IncompleteAdmin,
}

/// Credentials for the administrator created at startup
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Immutable runtime configuration, shared through the router state
#[derive(Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: SocketAddr,
    /// `None` runs against the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminBootstrap>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_name", &self.app_name)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("database_max_connections", &self.database_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("jwt_secret", &"***")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin", &self.admin)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse(
            "BIND_ADDR",
            get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse("DATABASE_MAX_CONNECTIONS", raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if database_max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "0", "must be at least 1"));
        }

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => parse_bool("RUN_MIGRATIONS", &raw)?,
            None => true,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let token_days: i64 = match get("ACCESS_TOKEN_EXPIRE_DAYS") {
            Some(raw) => parse("ACCESS_TOKEN_EXPIRE_DAYS", raw)?,
            None => DEFAULT_TOKEN_DAYS,
        };
        if !(1..=MAX_TOKEN_DAYS).contains(&token_days) {
            return Err(invalid(
                "ACCESS_TOKEN_EXPIRE_DAYS",
                &token_days.to_string(),
                format!("must be between 1 and {}", MAX_TOKEN_DAYS),
            ));
        }
        let access_token_ttl = Duration::try_days(token_days).ok_or_else(|| {
            invalid(
                "ACCESS_TOKEN_EXPIRE_DAYS",
                &token_days.to_string(),
                "out of range",
            )
        })?;

        let bcrypt_cost: u32 = match get("BCRYPT_COST") {
            Some(raw) => parse("BCRYPT_COST", raw)?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid(
                "BCRYPT_COST",
                &bcrypt_cost.to_string(),
                "must be between 4 and 31",
            ));
        }

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(email), Some(password)) => Some(AdminBootstrap {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::IncompleteAdmin),
        };

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            run_migrations,
            jwt_secret,
            jwt_algorithm,
            access_token_ttl,
            bcrypt_cost,
            admin,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| invalid(key, &raw, e.to_string()))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected a boolean")),
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(raw.to_string())),
    }
}
